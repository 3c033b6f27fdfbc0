//! Domain entities representing core business objects.

pub mod session;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use session::Session;
pub use token::{
    RefreshOutcome, RefreshVerification, TokenClaims, TokenPair, TokenType,
    ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
pub use user::{truncate_to_seconds, NewUser, User};
