//! Authentication configuration: token signing, sessions and password hashing

use serde::{Deserialize, Serialize};

use super::env_or;

const DEFAULT_ACCESS_SECRET: &str = "development-access-secret-change-in-production";
const DEFAULT_REFRESH_SECRET: &str = "development-refresh-secret-change-in-production";

/// HS512 signing configuration
///
/// Access and refresh tokens are signed with independent secrets so that one
/// kind can never be verified as the other.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret for access tokens
    pub access_secret: String,

    /// Secret for refresh tokens
    pub refresh_secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::from(DEFAULT_ACCESS_SECRET),
            refresh_secret: String::from(DEFAULT_REFRESH_SECRET),
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with both secrets
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    /// Check if either secret is still the development default
    pub fn is_using_default_secret(&self) -> bool {
        self.access_secret == DEFAULT_ACCESS_SECRET || self.refresh_secret == DEFAULT_REFRESH_SECRET
    }
}

/// Session and cookie configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// A refresh token whose session expires sooner than this (seconds) is rotated
    pub renewal_threshold: i64,

    /// Upper bound for a single store call in seconds
    pub store_timeout: u64,

    /// Cookie secure flag (HTTPS only)
    pub cookie_secure: bool,

    /// Cookie SameSite attribute
    pub same_site: String,

    /// Cookie HttpOnly flag
    #[serde(default = "default_http_only")]
    pub http_only: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            renewal_threshold: 1200, // 20 minutes
            store_timeout: 5,
            cookie_secure: false,
            same_site: String::from("Strict"),
            http_only: default_http_only(),
        }
    }
}

/// Password hashing parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PasswordHashConfig {
    /// Server-wide pepper appended to every salt
    pub pepper: String,

    /// PBKDF2 iteration count
    pub iterations: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            pepper: String::new(),
            iterations: 10_000,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Password hashing configuration
    #[serde(default)]
    pub password: PasswordHashConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let access_secret = std::env::var("JWT_ACCESS_SECRET")
            .unwrap_or_else(|_| DEFAULT_ACCESS_SECRET.to_string());
        let refresh_secret = std::env::var("JWT_REFRESH_SECRET")
            .unwrap_or_else(|_| DEFAULT_REFRESH_SECRET.to_string());
        let access_token_expiry = env_or("JWT_ACCESS_TOKEN_EXPIRY", 900);
        let refresh_token_expiry = env_or("JWT_REFRESH_TOKEN_EXPIRY", 604800);

        let defaults = SessionConfig::default();
        let session = SessionConfig {
            renewal_threshold: env_or("SESSION_RENEWAL_THRESHOLD", defaults.renewal_threshold),
            store_timeout: env_or("STORE_TIMEOUT", defaults.store_timeout),
            cookie_secure: env_or("COOKIE_SECURE", defaults.cookie_secure),
            ..defaults
        };

        let password = PasswordHashConfig {
            pepper: std::env::var("PASSWORD_HASH_PEPPER").unwrap_or_default(),
            iterations: env_or("PASSWORD_HASH_ITERATIONS", 10_000),
        };

        Self {
            jwt: JwtConfig {
                access_secret,
                refresh_secret,
                access_token_expiry,
                refresh_token_expiry,
            },
            session,
            password,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            session: SessionConfig::default(),
            password: PasswordHashConfig::default(),
        }
    }
}

fn default_http_only() -> bool {
    true
}
