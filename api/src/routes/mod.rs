//! HTTP route handlers
//!
//! - `auth` - login, logout, token refresh and password change
//! - `admin` - account management for administrators
//! - `alive` - liveness and readiness probes

pub mod admin;
pub mod alive;
pub mod auth;
