//! MySQL implementation of the SessionRepository trait.
//!
//! Session rows are keyed by the refresh token itself. The token column holds
//! live credentials, so nothing here logs it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use ag_core::domain::entities::session::Session;
use ag_core::errors::DomainError;
use ag_core::repositories::SessionRepository;

use super::{insert_error, internal};

/// MySQL implementation of SessionRepository
pub struct MySqlSessionRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlSessionRepository {
    /// Create a new MySQL session repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_session(row: &sqlx::mysql::MySqlRow) -> Result<Session, DomainError> {
        let token: String = row
            .try_get("token")
            .map_err(|e| internal("Failed to get token", e))?;
        let expires: DateTime<Utc> = row
            .try_get("expires")
            .map_err(|e| internal("Failed to get expires", e))?;
        let username: String = row
            .try_get("username")
            .map_err(|e| internal("Failed to get username", e))?;

        Ok(Session::new(token, expires, username))
    }
}

const INSERT_SESSION: &str = "INSERT INTO `session` (token, expires, username) VALUES (?, ?, ?)";

#[async_trait]
impl SessionRepository for MySqlSessionRepository {
    async fn create(&self, session: Session) -> Result<(), DomainError> {
        sqlx::query(INSERT_SESSION)
            .bind(&session.token)
            .bind(session.expires)
            .bind(&session.username)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error("session", "Failed to create session", e))?;

        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, DomainError> {
        let query = r#"
            SELECT token, expires, username
            FROM `session`
            WHERE token = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| internal("Failed to find session", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_session(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM `session` WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| internal("Failed to delete session", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_for_user_except(
        &self,
        username: &str,
        keep_token: &str,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM `session` WHERE username = ? AND NOT token = ?")
            .bind(username)
            .bind(keep_token)
            .execute(&self.pool)
            .await
            .map_err(|e| internal("Failed to delete other sessions", e))?;

        Ok(result.rows_affected())
    }

    async fn delete_all_for_user(&self, username: &str) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM `session` WHERE username = ?")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| internal("Failed to delete user sessions", e))?;

        Ok(result.rows_affected())
    }

    async fn delete_expired_for_user(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM `session` WHERE username = ? AND expires < ?")
            .bind(username)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| internal("Failed to delete expired sessions", e))?;

        Ok(result.rows_affected())
    }

    async fn rotate(&self, old_token: &str, replacement: Session) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| internal("Failed to begin transaction", e))?;

        // A concurrent rotation of the same token blocks on this row lock and
        // then finds nothing to delete.
        let deleted = sqlx::query("DELETE FROM `session` WHERE token = ?")
            .bind(old_token)
            .execute(&mut *tx)
            .await
            .map_err(|e| internal("Failed to delete rotated session", e))?
            .rows_affected();

        if deleted == 0 {
            tx.rollback()
                .await
                .map_err(|e| internal("Failed to roll back", e))?;
            return Ok(false);
        }

        sqlx::query(INSERT_SESSION)
            .bind(&replacement.token)
            .bind(replacement.expires)
            .bind(&replacement.username)
            .execute(&mut *tx)
            .await
            .map_err(|e| insert_error("session", "Failed to insert rotated session", e))?;

        tx.commit()
            .await
            .map_err(|e| internal("Failed to commit rotation", e))?;

        Ok(true)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| internal("Database ping failed", e))?;
        Ok(())
    }
}
