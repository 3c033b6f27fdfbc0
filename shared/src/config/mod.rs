//! Configuration module with business-specific sub-modules
//!
//! - `auth` - token secrets, lifetimes, session and password hashing settings
//! - `database` - database connection and pool configuration
//! - `environment` - environment detection
//! - `server` - HTTP server configuration

pub mod auth;
pub mod database;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::{AuthConfig, JwtConfig, PasswordHashConfig, SessionConfig};
pub use database::DatabaseConfig;
pub use environment::Environment;
pub use server::ServerConfig;

/// Parsed value of `key`, or `default` when unset or unparsable
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Which persistence backend the server wires in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// MySQL/MariaDB through the connection pool
    Mysql,
    /// Process-local store, lost on restart
    Memory,
}

impl StoreBackend {
    /// Read `STORE_BACKEND`, falling back to MySQL
    pub fn from_env() -> Self {
        match std::env::var("STORE_BACKEND")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "memory" | "mem" => StoreBackend::Memory,
            _ => StoreBackend::Mysql,
        }
    }
}

impl Default for StoreBackend {
    fn default() -> Self {
        StoreBackend::Mysql
    }
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Persistence backend
    #[serde(default)]
    pub store: StoreBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            store: StoreBackend::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        Self {
            environment: Environment::from_env(),
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
            store: StoreBackend::from_env(),
        }
    }

    /// Reject settings that must never reach production
    pub fn validate(&self) -> Result<(), String> {
        if self.auth.jwt.access_secret == self.auth.jwt.refresh_secret {
            return Err("access and refresh token secrets must differ".to_string());
        }
        if self.auth.jwt.access_token_expiry <= 0 || self.auth.jwt.refresh_token_expiry <= 0 {
            return Err("token lifetimes must be positive".to_string());
        }
        if self.environment.is_production() {
            if self.auth.jwt.is_using_default_secret() {
                return Err("default JWT secrets are not allowed in production".to_string());
            }
            if self.store == StoreBackend::Memory {
                return Err("the memory store is not allowed in production".to_string());
            }
        }
        Ok(())
    }
}
