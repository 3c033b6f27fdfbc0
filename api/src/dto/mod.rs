pub mod auth;

pub use auth::*;
pub use ag_shared::errors::ErrorResponse;
