//! Error types for authentication and token handling
//!
//! Messages are deliberately vague. Callers learn that a credential was
//! rejected, never which check rejected it.

use thiserror::Error;

/// Authentication and authorization failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown user, wrong password, or an unusable token
    #[error("Authentication failed")]
    Unauthorized,

    /// Authenticated, but the operation needs administrator rights
    #[error("Insufficient permissions")]
    Forbidden,

    /// A username or password did not satisfy the credential policy
    #[error("Credential policy violation")]
    PolicyViolation,
}

/// Token decoding and signing failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    SignatureInvalid,

    #[error("Token expired")]
    Expired,

    #[error("Unexpected token type")]
    WrongType,

    #[error("Token generation failed")]
    GenerationFailed,
}
