//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) carrying their own salt and
//! parameters, so verification needs nothing but the stored string.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    #[error("password hashing failed")]
    Hash,

    #[error("stored password hash is not a valid PHC string")]
    MalformedHash,

    #[error("password does not match")]
    Mismatch,
}

/// Check length requirements.
///
/// # Errors
///
/// Returns `PasswordError::TooShort` below [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    Ok(())
}

/// Hash a password using Argon2id with a random salt.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::Hash)
}

/// Verify a password against a stored PHC hash.
///
/// # Errors
///
/// `MalformedHash` if `phc` does not parse, `Mismatch` if the password is wrong.
pub fn verify_password(password: &str, phc: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(phc).map_err(|_| PasswordError::MalformedHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| PasswordError::Mismatch)
}

/// Whether `phc` parses as a PHC hash string.
#[must_use]
pub fn is_phc_hash(phc: &str) -> bool {
    PasswordHash::new(phc).is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("motorcoach-2020").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(is_phc_hash(&hash));

        verify_password("motorcoach-2020", &hash).unwrap();
        assert_eq!(
            verify_password("motorcoach-2021", &hash),
            Err(PasswordError::Mismatch)
        );
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let a = hash_password("motorcoach-2020").unwrap();
        let b = hash_password("motorcoach-2020").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_reported() {
        assert_eq!(
            verify_password("anything", "plaintext"),
            Err(PasswordError::MalformedHash)
        );
        assert!(!is_phc_hash("plaintext"));
    }

    #[test]
    fn test_minimum_length() {
        assert_eq!(validate_password("short"), Err(PasswordError::TooShort));
        assert!(validate_password("eightchr").is_ok());
    }
}
