//! MySQL-specific database implementations
//!
//! This module contains MySQL implementations of repository traits
//! using SQLx for database operations.

pub mod session_repository_impl;
pub mod user_repository_impl;

// Re-export the MySQL implementations
pub use session_repository_impl::MySqlSessionRepository;
pub use user_repository_impl::MySqlUserRepository;

use ag_core::errors::DomainError;

/// Wrap a driver error as an internal domain error
pub(crate) fn internal(context: &str, error: sqlx::Error) -> DomainError {
    DomainError::Internal {
        message: format!("{}: {}", context, error),
    }
}

/// Map an INSERT failure, turning a duplicate primary key into a conflict
pub(crate) fn insert_error(resource: &str, context: &str, error: sqlx::Error) -> DomainError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::Conflict {
            resource: resource.to_string(),
        },
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => DomainError::NotFound {
            resource: "user".to_string(),
        },
        _ => internal(context, error),
    }
}
