//! Shared configuration and common types for the AuthGate server
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - The error response body returned by every endpoint
//! - Health check response types

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, DatabaseConfig, Environment, JwtConfig, PasswordHashConfig,
    ServerConfig, SessionConfig, StoreBackend,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{HealthResponse, HealthStatus};
