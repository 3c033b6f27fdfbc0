//! Token entities for JWT-based authentication.

use serde::{Deserialize, Serialize};

/// Name of the cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "X-ACCESS-TOKEN";

/// Name of the cookie carrying the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "X-REFRESH-TOKEN";

/// Kind of a signed token
///
/// Each kind is signed with its own secret, and the kind is also carried in
/// the payload so a token verified with the wrong expectation is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity carried by a token, without any transport fields
///
/// `is_admin` is a snapshot taken when the token was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Username the token was issued to
    pub username: String,

    /// Administrator flag at issuance
    #[serde(rename = "admin")]
    pub is_admin: bool,

    /// Access or refresh
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

impl TokenClaims {
    /// Creates claims for an access token
    pub fn access(username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            username: username.into(),
            is_admin,
            token_type: TokenType::Access,
        }
    }

    /// Creates claims for a refresh token
    pub fn refresh(username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            username: username.into(),
            is_admin,
            token_type: TokenType::Refresh,
        }
    }

    /// Same identity, different token kind
    pub fn as_type(&self, token_type: TokenType) -> Self {
        Self {
            username: self.username.clone(),
            is_admin: self.is_admin,
            token_type,
        }
    }
}

/// Access and refresh token issued together at login
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token, also the session key
    pub refresh_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_in: i64,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in,
            refresh_expires_in,
        }
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("access_expires_in", &self.access_expires_in)
            .field("refresh_expires_in", &self.refresh_expires_in)
            .finish()
    }
}

/// Result of checking a refresh token against the session store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshVerification {
    /// Claims decoded from the token
    pub claims: TokenClaims,

    /// The session expires within the renewal window
    pub need_renew: bool,
}

/// Result of exchanging a refresh token for a new access token
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Newly minted access token
    pub access_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Replacement refresh token when the old one was rotated
    pub refresh_token: Option<String>,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,
}

impl std::fmt::Debug for RefreshOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshOutcome")
            .field("access_token", &"<redacted>")
            .field("rotated", &self.refresh_token.is_some())
            .finish()
    }
}
