//! User repository trait defining the interface for account persistence.

use async_trait::async_trait;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User persistence operations
///
/// The two cascading operations touch the session table as well. They are
/// declared here because they must commit together with the user row.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by username
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No such user
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Create a new user
    ///
    /// # Returns
    /// * `Ok(User)` - The stored user
    /// * `Err(DomainError::Conflict)` - The username is taken
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Replace the password hash and delete every session of the user, atomically
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of sessions revoked
    /// * `Err(DomainError::NotFound)` - No such user; nothing changed
    async fn update_password_and_revoke_sessions(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<u64, DomainError>;

    /// Delete the user together with all of their sessions, atomically
    ///
    /// # Returns
    /// * `Ok(true)` - User deleted
    /// * `Ok(false)` - No such user
    async fn delete_with_sessions(&self, username: &str) -> Result<bool, DomainError>;

    /// Check whether a username is taken
    async fn exists(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self.find_by_username(username).await?.is_some())
    }
}
