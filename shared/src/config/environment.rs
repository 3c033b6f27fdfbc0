//! Deployment environment, read from `AUTHGATE_ENV`

use serde::{Deserialize, Serialize};

/// Where the service is running
///
/// Production turns on the strict checks in `AppConfig::validate`; the
/// other two only differ in default log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }

    /// Unknown or missing values fall back to development
    pub fn from_env() -> Self {
        std::env::var("AUTHGATE_ENV")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// Filter handed to env_logger when `RUST_LOG` is unset
    pub fn default_log_level(&self) -> &'static str {
        if self.is_production() {
            "info"
        } else if *self == Environment::Staging {
            "info,ag_core=debug"
        } else {
            "debug"
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        [
            Environment::Development,
            Environment::Staging,
            Environment::Production,
        ]
        .into_iter()
        .find(|env| env.as_str() == lowered || env.as_str()[..3] == lowered)
        .ok_or_else(|| format!("unknown environment '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_and_short_names() {
        assert_eq!("production".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("PRO".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!(" dev ".parse::<Environment>(), Ok(Environment::Development));
        assert_eq!("sta".parse::<Environment>(), Ok(Environment::Staging));
        assert!("moon".parse::<Environment>().is_err());
        assert!("".parse::<Environment>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let env = Environment::Staging;
        assert_eq!(env.to_string().parse::<Environment>(), Ok(env));
    }

    #[test]
    fn test_log_level_by_environment() {
        assert_eq!(Environment::Production.default_log_level(), "info");
        assert_eq!(Environment::default().default_log_level(), "debug");
    }
}
