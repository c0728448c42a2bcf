//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_BASE_URL` - Public URL for the admin panel
//! - `ADMIN_EMAIL` - The administrator's login email
//! - `ADMIN_PASSWORD_HASH` - Argon2 PHC string for the administrator's
//!   password (generate with `ce-cli admin hash-password`)
//! - `ADMIN_DATABASE_URL` (or `DATABASE_URL`) - when the record backend is
//!   `postgres`
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_SESSION_HOURS` - Session inactivity expiry (default: 12)
//! - `ADMIN_LOG_JSON` - Emit JSON logs for structured parsing (default: false)
//! - `ADMIN_RECORD_BACKEND` - `postgres` or `memory`
//! - `OBJECT_STORE_*` - see `coach_exchange_store::config`
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE` - Sentry error tracking

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use secrecy::SecretString;

use coach_exchange_core::Email;
use coach_exchange_core::password::is_phc_hash;
use coach_exchange_store::{ConfigError, Env, StoreConfig};

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// The single administrator account
    pub admin_email: Email,
    /// Argon2 PHC hash of the administrator's password
    pub admin_password_hash: SecretString,
    /// Hours of inactivity before an admin session expires
    pub session_hours: i64,
    pub log_json: bool,
    /// Record and object backends
    pub store: StoreConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::load(&Env::process())
    }

    /// Load configuration from an [`Env`].
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn load<F>(env: &Env<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let admin_email = Email::parse(&env.required("ADMIN_EMAIL")?)
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_EMAIL".to_string(), e.to_string()))?;

        let hash = env.required("ADMIN_PASSWORD_HASH")?;
        if !is_phc_hash(&hash) {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_PASSWORD_HASH".to_string(),
                "must be an Argon2 PHC string (see `ce-cli admin hash-password`)".to_string(),
            ));
        }

        let session_hours = env.parse_or("ADMIN_SESSION_HOURS", 12_i64)?;
        if session_hours < 1 {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_SESSION_HOURS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host: env.parse_or("ADMIN_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: env.parse_or("ADMIN_PORT", 3001)?,
            base_url: env.required("ADMIN_BASE_URL")?,
            admin_email,
            admin_password_hash: SecretString::from(hash),
            session_hours,
            log_json: env.parse_or("ADMIN_LOG_JSON", false)?,
            store: StoreConfig::load("ADMIN", env)?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// In-memory backends with the given administrator. Used by the HTTP
    /// tests.
    #[must_use]
    pub fn in_memory(admin_email: Email, admin_password_hash: String) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            admin_email,
            admin_password_hash: SecretString::from(admin_password_hash),
            session_hours: 12,
            log_json: false,
            store: StoreConfig::in_memory(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use coach_exchange_core::password::hash_password;
    use secrecy::ExposeSecret;

    use super::*;

    fn env(vars: Vec<(&str, String)>) -> Env<impl Fn(&str) -> Option<String>> {
        let map: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect();
        Env::new(move |key: &str| map.get(key).cloned())
    }

    fn base(hash: String) -> Vec<(&'static str, String)> {
        vec![
            ("ADMIN_BASE_URL", "https://admin.coaches.test".to_string()),
            ("ADMIN_EMAIL", "Owner@Coaches.test".to_string()),
            ("ADMIN_PASSWORD_HASH", hash),
            ("ADMIN_RECORD_BACKEND", "memory".to_string()),
        ]
    }

    #[test]
    fn test_defaults() {
        let hash = hash_password("correct horse").unwrap();
        let config = AdminConfig::load(&env(base(hash.clone()))).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3001");
        assert_eq!(config.session_hours, 12);
        assert_eq!(config.admin_email.as_str(), "owner@coaches.test");
        assert_eq!(config.admin_password_hash.expose_secret(), hash);
        assert!(config.is_secure());
        assert!(!config.log_json);
    }

    #[test]
    fn test_password_hash_must_be_phc() {
        let err = AdminConfig::load(&env(base("hunter22".to_string()))).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "ADMIN_PASSWORD_HASH"));
    }

    #[test]
    fn test_admin_email_required() {
        let mut vars = base(hash_password("correct horse").unwrap());
        vars.retain(|(k, _)| *k != "ADMIN_EMAIL");
        let err = AdminConfig::load(&env(vars)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "ADMIN_EMAIL"));
    }

    #[test]
    fn test_hash_is_redacted_in_debug() {
        let hash = hash_password("correct horse").unwrap();
        let config = AdminConfig::load(&env(base(hash.clone()))).unwrap();
        assert!(!format!("{config:?}").contains(&hash));
    }
}
