//! In-memory implementation of the user and session repositories
//!
//! Both tables live behind a single lock, so the cascading operations and
//! rotation are atomic the same way a database transaction would make them.
//! Used by tests and by the `memory` store backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::session::Session;
use crate::domain::entities::user::User;
use crate::errors::DomainError;

use super::session::SessionRepository;
use super::user::UserRepository;

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    sessions: HashMap<String, Session>,
}

/// Process-local store for users and sessions
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    available: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Create a store seeded with users
    pub async fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let store = Self::new();
        {
            let mut tables = store.tables.write().await;
            for user in users {
                tables.users.insert(user.username.clone(), user);
            }
        }
        store
    }

    /// Simulate an outage: while unavailable every call fails
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Sessions currently held for `username`
    pub async fn sessions_for(&self, username: &str) -> Vec<Session> {
        let tables = self.tables.read().await;
        tables
            .sessions
            .values()
            .filter(|s| s.username == username)
            .cloned()
            .collect()
    }

    /// Total number of sessions across all users
    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DomainError::Internal {
                message: "In-memory store unavailable".to_string(),
            })
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.users.get(username).cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if tables.users.contains_key(&user.username) {
            return Err(DomainError::Conflict {
                resource: "user".to_string(),
            });
        }

        tables.users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn update_password_and_revoke_sessions(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<u64, DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        match tables.users.get_mut(username) {
            Some(user) => user.password_hash = password_hash.to_string(),
            None => {
                return Err(DomainError::NotFound {
                    resource: "user".to_string(),
                })
            }
        }

        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.username != username);
        Ok((before - tables.sessions.len()) as u64)
    }

    async fn delete_with_sessions(&self, username: &str) -> Result<bool, DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if tables.users.remove(username).is_none() {
            return Ok(false);
        }
        tables.sessions.retain(|_, s| s.username != username);
        Ok(true)
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn create(&self, session: Session) -> Result<(), DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if tables.sessions.contains_key(&session.token) {
            return Err(DomainError::Conflict {
                resource: "session".to_string(),
            });
        }

        tables.sessions.insert(session.token.clone(), session);
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, DomainError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.sessions.get(token).cloned())
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        Ok(tables.sessions.remove(token).is_some())
    }

    async fn delete_all_for_user_except(
        &self,
        username: &str,
        keep_token: &str,
    ) -> Result<u64, DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables
            .sessions
            .retain(|token, s| s.username != username || token == keep_token);
        Ok((before - tables.sessions.len()) as u64)
    }

    async fn delete_all_for_user(&self, username: &str) -> Result<u64, DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.username != username);
        Ok((before - tables.sessions.len()) as u64)
    }

    async fn delete_expired_for_user(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables
            .sessions
            .retain(|_, s| s.username != username || !s.is_expired(now));
        Ok((before - tables.sessions.len()) as u64)
    }

    async fn rotate(&self, old_token: &str, replacement: Session) -> Result<bool, DomainError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if tables.sessions.contains_key(&replacement.token) {
            return Err(DomainError::Conflict {
                resource: "session".to_string(),
            });
        }
        if tables.sessions.remove(old_token).is_none() {
            return Ok(false);
        }

        tables.sessions.insert(replacement.token.clone(), replacement);
        Ok(true)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.check_available()
    }
}
