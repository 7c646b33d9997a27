//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::password::HashError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Never says which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password too short.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Registration data breaks a role or commune rule.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Password hashing error.
    #[error("password hashing error: {0}")]
    Hash(#[from] HashError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
