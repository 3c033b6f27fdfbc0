//! Session repository trait defining the interface for refresh-session persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::session::Session;
use crate::errors::DomainError;

/// Repository trait for Session persistence operations
///
/// A session row is the source of truth for whether a refresh token is still
/// usable. Deleting the row revokes the token even though its signature
/// remains valid.
///
/// # Security Considerations
/// - The token column holds live bearer credentials and must never be logged
/// - `rotate` must be atomic: a presented token can be rotated at most once
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new session
    ///
    /// # Returns
    /// * `Ok(())` - Session stored
    /// * `Err(DomainError::Conflict)` - A session with this token already exists
    async fn create(&self, session: Session) -> Result<(), DomainError>;

    /// Find a session by its refresh token
    ///
    /// # Returns
    /// * `Ok(Some(Session))` - Session found
    /// * `Ok(None)` - No session for this token
    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, DomainError>;

    /// Delete one session
    ///
    /// # Returns
    /// * `Ok(true)` - A row was deleted
    /// * `Ok(false)` - Nothing matched; deleting again is not an error
    async fn delete_by_token(&self, token: &str) -> Result<bool, DomainError>;

    /// Delete every session of `username` except the one keyed by `keep_token`
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of sessions deleted
    async fn delete_all_for_user_except(
        &self,
        username: &str,
        keep_token: &str,
    ) -> Result<u64, DomainError>;

    /// Delete every session of `username`
    async fn delete_all_for_user(&self, username: &str) -> Result<u64, DomainError>;

    /// Delete the sessions of `username` whose expiry lies before `now`
    async fn delete_expired_for_user(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    /// Replace the session keyed by `old_token` with `replacement`
    ///
    /// The delete and the insert form one atomic unit. When the old row is
    /// already gone nothing is inserted.
    ///
    /// # Returns
    /// * `Ok(true)` - Old session removed and replacement stored
    /// * `Ok(false)` - Old session did not exist (already rotated or revoked)
    async fn rotate(&self, old_token: &str, replacement: Session) -> Result<bool, DomainError>;

    /// Check that the backing store answers
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
