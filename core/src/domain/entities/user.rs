//! User entity representing an account that can log in.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// User entity as persisted in the `user` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique login name, also the primary key
    pub username: String,

    /// Derived password hash, never the plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Account creation time, whole seconds only
    pub member_since: DateTime<Utc>,

    /// Administrator flag
    pub is_admin: bool,
}

impl User {
    /// Creates a new User; `member_since` is truncated to whole seconds
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        member_since: DateTime<Utc>,
        is_admin: bool,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            member_since: truncate_to_seconds(member_since),
            is_admin,
        }
    }

    /// `member_since` in the form fed to the password hasher
    pub fn member_since_iso(&self) -> String {
        to_iso_millis(self.member_since)
    }
}

/// Data an administrator supplies to create an account
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    /// Defaults to the current time when absent
    pub member_since: Option<DateTime<Utc>>,
    pub is_admin: bool,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("member_since", &self.member_since)
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

/// Drops sub-second precision
pub fn truncate_to_seconds(time: DateTime<Utc>) -> DateTime<Utc> {
    time.with_nanosecond(0).unwrap_or(time)
}

/// ISO-8601 with millisecond precision and a `Z` suffix,
/// e.g. `2021-03-10T00:50:43.000Z`
pub fn to_iso_millis(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
