//! MySQL implementation of the UserRepository trait.
//!
//! The password-change and delete operations also touch the `session` table.
//! Each runs in one transaction, so a failure part way leaves no trace.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use ag_core::domain::entities::user::User;
use ag_core::errors::DomainError;
use ag_core::repositories::UserRepository;

use super::{insert_error, internal};

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity
    fn row_to_user(row: &sqlx::mysql::MySqlRow) -> Result<User, DomainError> {
        let username: String = row
            .try_get("username")
            .map_err(|e| internal("Failed to get username", e))?;
        let password_hash: String = row
            .try_get("password")
            .map_err(|e| internal("Failed to get password", e))?;
        let member_since: DateTime<Utc> = row
            .try_get("membersince")
            .map_err(|e| internal("Failed to get membersince", e))?;
        let is_admin: bool = row
            .try_get("admin")
            .map_err(|e| internal("Failed to get admin", e))?;

        Ok(User::new(username, password_hash, member_since, is_admin))
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let query = r#"
            SELECT username, password, membersince, admin
            FROM `user`
            WHERE username = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| internal("Failed to find user", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let query = r#"
            INSERT INTO `user` (username, password, membersince, admin)
            VALUES (?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.member_since)
            .bind(user.is_admin)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error("user", "Failed to create user", e))?;

        Ok(user)
    }

    async fn update_password_and_revoke_sessions(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<u64, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| internal("Failed to begin transaction", e))?;

        // Lock the row; UPDATE alone reports 0 rows when the hash is unchanged
        let existing = sqlx::query("SELECT username FROM `user` WHERE username = ? FOR UPDATE")
            .bind(username)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| internal("Failed to lock user", e))?;

        if existing.is_none() {
            tx.rollback()
                .await
                .map_err(|e| internal("Failed to roll back", e))?;
            return Err(DomainError::NotFound {
                resource: "user".to_string(),
            });
        }

        sqlx::query("UPDATE `user` SET password = ? WHERE username = ?")
            .bind(password_hash)
            .bind(username)
            .execute(&mut *tx)
            .await
            .map_err(|e| internal("Failed to update password", e))?;

        let revoked = sqlx::query("DELETE FROM `session` WHERE username = ?")
            .bind(username)
            .execute(&mut *tx)
            .await
            .map_err(|e| internal("Failed to revoke sessions", e))?
            .rows_affected();

        tx.commit()
            .await
            .map_err(|e| internal("Failed to commit password change", e))?;

        Ok(revoked)
    }

    async fn delete_with_sessions(&self, username: &str) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| internal("Failed to begin transaction", e))?;

        sqlx::query("DELETE FROM `session` WHERE username = ?")
            .bind(username)
            .execute(&mut *tx)
            .await
            .map_err(|e| internal("Failed to delete sessions", e))?;

        let deleted = sqlx::query("DELETE FROM `user` WHERE username = ?")
            .bind(username)
            .execute(&mut *tx)
            .await
            .map_err(|e| internal("Failed to delete user", e))?
            .rows_affected();

        if deleted == 0 {
            tx.rollback()
                .await
                .map_err(|e| internal("Failed to roll back", e))?;
            return Ok(false);
        }

        tx.commit()
            .await
            .map_err(|e| internal("Failed to commit user deletion", e))?;

        Ok(true)
    }

    async fn exists(&self, username: &str) -> Result<bool, DomainError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM `user` WHERE username = ?) AS present")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| internal("Failed to check user existence", e))?;

        let present: i64 = row
            .try_get("present")
            .map_err(|e| internal("Failed to read existence result", e))?;

        Ok(present == 1)
    }
}
