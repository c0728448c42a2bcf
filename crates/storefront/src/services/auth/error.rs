//! Authentication error types.

use thiserror::Error;

use coach_exchange_core::ValidationError;
use coach_exchange_core::password::PasswordError;
use coach_exchange_store::StoreError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration fields failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unknown email or wrong password. The two are not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Record store error.
    #[error("database error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing error.
    #[error("password hashing error: {0}")]
    PasswordHash(PasswordError),
}
