//! Type definitions shared by the server crates
//!
//! - `response` - health check responses

pub mod response;

pub use response::{HealthResponse, HealthStatus, ServiceHealth};
