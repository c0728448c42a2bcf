//! Admin account commands.
//!
//! # Usage
//!
//! ```bash
//! # Type the password, then press Enter; the hash goes to stdout
//! ce-cli admin hash-password
//!
//! # Or pipe it in
//! printf '%s\n' "$PASSWORD" | ce-cli admin hash-password
//! ```
//!
//! Put the printed PHC string in `ADMIN_PASSWORD_HASH`.

use std::io::BufRead;

use thiserror::Error;

use coach_exchange_core::password::{self, PasswordError};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Could not read password: {0}")]
    Read(#[from] std::io::Error),

    #[error("{0}")]
    Password(#[from] PasswordError),
}

/// Hash the first line of `input`.
fn hash_line(input: impl BufRead) -> Result<String, AdminError> {
    let line = input.lines().next().transpose()?.unwrap_or_default();
    let password = line.trim_end_matches(['\r', '\n']);

    password::validate_password(password)?;
    Ok(password::hash_password(password)?)
}

/// Read a password from stdin and print its Argon2id hash.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or the password is too short.
pub fn hash_password() -> Result<(), AdminError> {
    tracing::info!(
        "Enter the admin password (min {} characters):",
        password::MIN_PASSWORD_LENGTH
    );
    let hash = hash_line(std::io::stdin().lock())?;

    #[allow(clippy::print_stdout)]
    {
        println!("{hash}");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hashes_first_line_only() {
        let hash = hash_line("correct horse\nignored\n".as_bytes()).unwrap();
        assert!(password::verify_password("correct horse", &hash).is_ok());
        assert!(password::is_phc_hash(&hash));
    }

    #[test]
    fn test_short_password_is_refused() {
        let err = hash_line("short\n".as_bytes()).unwrap_err();
        assert!(matches!(err, AdminError::Password(PasswordError::TooShort)));

        let err = hash_line("".as_bytes()).unwrap_err();
        assert!(matches!(err, AdminError::Password(PasswordError::TooShort)));
    }
}
