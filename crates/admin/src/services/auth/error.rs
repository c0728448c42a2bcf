//! Admin authentication error types.

use thiserror::Error;

use coach_exchange_core::password::PasswordError;

/// Errors that can occur during admin login.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Wrong email or wrong password. The two are not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The configured hash could not be read.
    #[error("password hash error: {0}")]
    PasswordHash(PasswordError),
}
