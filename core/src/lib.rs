//! # AuthGate Core
//!
//! Domain layer for the AuthGate session service.
//! This crate contains domain entities, the session lifecycle service,
//! repository interfaces, and error types. It performs no I/O of its own;
//! storage is reached through the repository traits.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    NewUser, RefreshOutcome, RefreshVerification, Session, TokenClaims, TokenPair, TokenType,
    User,
};
pub use errors::{AuthError, DomainError, DomainResult, TokenError};
pub use repositories::{InMemoryStore, SessionRepository, UserRepository};
pub use services::{
    AuthService, AuthServiceConfig, Clock, FixedClock, PasswordHasher, Pbkdf2Hasher, SystemClock,
    TokenCodec, TokenCodecConfig,
};
