//! Configuration for the authentication service

use ag_shared::config::SessionConfig;
use chrono::Duration;

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// A refresh session ending sooner than this is rotated on refresh
    pub renewal_threshold: Duration,
    /// Upper bound on every store call
    pub store_timeout: std::time::Duration,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for AuthServiceConfig {
    fn from(session: &SessionConfig) -> Self {
        Self {
            renewal_threshold: Duration::seconds(session.renewal_threshold),
            store_timeout: std::time::Duration::from_secs(session.store_timeout.max(1)),
        }
    }
}
