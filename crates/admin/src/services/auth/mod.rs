//! Admin authentication service.
//!
//! The panel has one administrator whose email and Argon2 password hash
//! come from configuration. There is no admin user table.

mod error;

pub use error::AdminAuthError;

use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};

use coach_exchange_core::Email;
use coach_exchange_core::password::{PasswordError, verify_password};

use crate::config::AdminConfig;
use crate::models::CurrentAdmin;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    config: &'a AdminConfig,
}

impl<'a> AdminAuthService<'a> {
    #[must_use]
    pub const fn new(config: &'a AdminConfig) -> Self {
        Self { config }
    }

    /// Check credentials against the configured administrator.
    ///
    /// The password is verified even when the email does not match, so both
    /// failures take the same time.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` for a wrong email or password
    /// - `PasswordHash` if the configured hash is unreadable
    pub fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<CurrentAdmin, AdminAuthError> {
        let email_matches = Email::parse(email).is_ok_and(|e| e == self.config.admin_email);

        match verify_password(
            password.expose_secret(),
            self.config.admin_password_hash.expose_secret(),
        ) {
            Ok(()) if email_matches => {}
            Ok(()) | Err(PasswordError::Mismatch) => {
                return Err(AdminAuthError::InvalidCredentials);
            }
            Err(err) => {
                tracing::error!(error = %err, "Configured admin password hash is unreadable");
                return Err(AdminAuthError::PasswordHash(err));
            }
        }

        Ok(CurrentAdmin::new(
            self.config.admin_email.clone(),
            Utc::now(),
            Duration::hours(self.config.session_hours),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coach_exchange_core::password::hash_password;

    use super::*;

    fn config() -> AdminConfig {
        AdminConfig::in_memory(
            Email::parse("owner@coaches.test").unwrap(),
            hash_password("correct horse").unwrap(),
        )
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn test_login_with_configured_credentials() {
        let config = config();
        let admin = AdminAuthService::new(&config)
            .login("Owner@Coaches.test", &secret("correct horse"))
            .unwrap();
        assert_eq!(admin.email.as_str(), "owner@coaches.test");
        assert!(!admin.is_expired(Utc::now()));
    }

    #[test]
    fn test_wrong_email_and_wrong_password_look_the_same() {
        let config = config();
        let auth = AdminAuthService::new(&config);

        let wrong_email = auth
            .login("someone@coaches.test", &secret("correct horse"))
            .unwrap_err();
        let wrong_password = auth
            .login("owner@coaches.test", &secret("battery staple"))
            .unwrap_err();
        let not_an_email = auth.login("owner", &secret("correct horse")).unwrap_err();

        for err in [wrong_email, wrong_password, not_an_email] {
            assert!(matches!(err, AdminAuthError::InvalidCredentials));
        }
    }
}
