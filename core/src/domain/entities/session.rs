//! Session entity: one row per issued refresh token.

use chrono::{DateTime, Duration, Utc};

/// A revocable login session keyed by the exact refresh token string
///
/// The token is a bearer credential, so `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// The refresh token, primary key
    pub token: String,

    /// Server-side expiry, authoritative over the token's own `exp`
    pub expires: DateTime<Utc>,

    /// Owner of the session
    pub username: String,
}

impl Session {
    pub fn new(token: impl Into<String>, expires: DateTime<Utc>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires,
            username: username.into(),
        }
    }

    /// A session whose expiry lies strictly before `now` is dead
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires < now
    }

    /// True when the session ends before `now + window`
    pub fn expires_within(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.expires < now + window
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("expires", &self.expires)
            .field("username", &self.username)
            .finish()
    }
}
