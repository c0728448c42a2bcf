//! Customer authentication service.
//!
//! Email and password accounts. Passwords are hashed with Argon2id; the
//! hash never leaves the record store except to be verified here.

mod error;

pub use error::AuthError;

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use coach_exchange_core::password::{self, PasswordError};
use coach_exchange_core::{Email, NewUser, User, ValidationError};
use coach_exchange_store::RecordStore;

/// Registration input as submitted.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

/// Authentication service.
///
/// Handles customer registration and login.
pub struct AuthService<'a> {
    users: &'a dyn RecordStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn RecordStore) -> Self {
        Self { users }
    }

    /// Register a new customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` naming every invalid field.
    /// Returns `AuthError::UserAlreadyExists` if the email is already
    /// registered; nothing is written in that case.
    #[instrument(skip_all)]
    pub async fn register(&self, registration: &Registration) -> Result<User, AuthError> {
        let mut errors = ValidationError::new();
        let name = errors.required_text("name", &registration.name);
        let email = match Email::parse(&registration.email) {
            Ok(email) => Some(email),
            Err(err) => {
                errors.add("email", err.to_string());
                None
            }
        };
        if let Err(err) = password::validate_password(registration.password.expose_secret()) {
            errors.add("password", err.to_string());
        }
        errors.finish(())?;
        let Some(email) = email else {
            return Err(ValidationError::single("email", "is required").into());
        };

        if self.users.find_user_by_email(&email).await?.is_some() {
            tracing::info!("Registration rejected: email already registered");
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = password::hash_password(registration.password.expose_secret())
            .map_err(AuthError::PasswordHash)?;

        let user = self
            .users
            .insert_user(&NewUser {
                name,
                email,
                password_hash,
            })
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    AuthError::UserAlreadyExists
                } else {
                    AuthError::Store(e)
                }
            })?;

        tracing::info!(user_id = %user.id, "Customer registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a malformed or unknown
    /// email and for a wrong password alike.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .find_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        match password::verify_password(password.expose_secret(), &password_hash) {
            Ok(()) => Ok(user),
            Err(PasswordError::MalformedHash) => {
                tracing::error!(user_id = %user.id, "Stored password hash is malformed");
                Err(AuthError::InvalidCredentials)
            }
            Err(_) => Err(AuthError::InvalidCredentials),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coach_exchange_store::{MemoryRecordStore, UserStore};

    use super::*;

    fn registration(email: &str, password: &str) -> Registration {
        Registration {
            name: "Dana Driver".to_string(),
            email: email.to_string(),
            password: SecretString::from(password),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryRecordStore::new();
        let auth = AuthService::new(&store);

        let user = auth
            .register(&registration("dana@example.com", "long-enough-pw"))
            .await
            .unwrap();
        assert_eq!(user.name, "Dana Driver");

        let logged_in = auth
            .login("dana@example.com", &SecretString::from("long-enough-pw"))
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_writes_nothing() {
        let store = MemoryRecordStore::new();
        let auth = AuthService::new(&store);
        auth.register(&registration("dana@example.com", "long-enough-pw"))
            .await
            .unwrap();

        let err = auth
            .register(&registration("dana@example.com", "another-password"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_register_reports_every_invalid_field() {
        let store = MemoryRecordStore::new();
        let auth = AuthService::new(&store);

        let err = auth
            .register(&Registration {
                name: "  ".to_string(),
                email: "not-an-email".to_string(),
                password: SecretString::from("short"),
            })
            .await
            .unwrap_err();

        let AuthError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.has("name"));
        assert!(errors.has("email"));
        assert!(errors.has("password"));
        assert_eq!(store.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_look_the_same() {
        let store = MemoryRecordStore::new();
        let auth = AuthService::new(&store);
        auth.register(&registration("dana@example.com", "long-enough-pw"))
            .await
            .unwrap();

        let unknown = auth
            .login("nobody@example.com", &SecretString::from("long-enough-pw"))
            .await
            .unwrap_err();
        let wrong = auth
            .login("dana@example.com", &SecretString::from("wrong-password"))
            .await
            .unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(wrong, AuthError::InvalidCredentials));
    }
}
