//! Authentication service module
//!
//! This module provides the refresh-session lifecycle:
//! - Credential policy for usernames and passwords
//! - Login, refresh and refresh token rotation
//! - Logout of one or all other sessions
//! - Password change and administrator account management

mod config;
mod credential_rules;
mod password_hasher;
mod service;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use credential_rules::{validate_password, validate_username};
pub use password_hasher::{PasswordHasher, Pbkdf2Hasher};
pub use service::AuthService;
