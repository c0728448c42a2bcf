//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - when the record backend
//!   is `postgres`
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_SESSION_DAYS` - Session inactivity expiry (default: 7)
//! - `STOREFRONT_LISTING_CACHE_SECS` - Approved listing cache TTL (default: 30)
//! - `STOREFRONT_RATE_LIMIT` - Per-IP rate limiting on auth and submission
//!   routes (default: true)
//! - `STOREFRONT_RECORD_BACKEND` - `postgres` or `memory`
//! - `OBJECT_STORE_*` - see `coach_exchange_store::config`
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE` - Sentry error tracking

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use coach_exchange_store::{ConfigError, Env, StoreConfig};

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Days of inactivity before a customer session expires
    pub session_days: i64,
    /// How long the approved listing collection is cached
    pub listing_cache_ttl: Duration,
    pub rate_limit: bool,
    /// Record and object backends
    pub store: StoreConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
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
        let session_days = env.parse_or("STOREFRONT_SESSION_DAYS", 7_i64)?;
        if session_days < 1 {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_SESSION_DAYS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host: env.parse_or("STOREFRONT_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: env.parse_or("STOREFRONT_PORT", 3000)?,
            base_url: env.required("STOREFRONT_BASE_URL")?,
            session_days,
            listing_cache_ttl: Duration::from_secs(
                env.parse_or("STOREFRONT_LISTING_CACHE_SECS", 30)?,
            ),
            rate_limit: env.parse_or("STOREFRONT_RATE_LIMIT", true)?,
            store: StoreConfig::load("STOREFRONT", env)?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// In-memory backends, no rate limiting. Used by the HTTP tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_days: 7,
            listing_cache_ttl: Duration::from_secs(30),
            rate_limit: false,
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

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Env<impl Fn(&str) -> Option<String>> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Env::new(move |key: &str| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::load(&env(&[
            ("STOREFRONT_BASE_URL", "https://coaches.test"),
            ("STOREFRONT_RECORD_BACKEND", "memory"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.session_days, 7);
        assert_eq!(config.listing_cache_ttl, Duration::from_secs(30));
        assert!(config.rate_limit);
        assert!(config.is_secure());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_base_url_required() {
        let err = StorefrontConfig::load(&env(&[("STOREFRONT_RECORD_BACKEND", "memory")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "STOREFRONT_BASE_URL"));
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = StorefrontConfig::load(&env(&[
            ("STOREFRONT_BASE_URL", "http://localhost:3000"),
            ("STOREFRONT_RECORD_BACKEND", "memory"),
            ("STOREFRONT_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "STOREFRONT_PORT"));

        let err = StorefrontConfig::load(&env(&[
            ("STOREFRONT_BASE_URL", "http://localhost:3000"),
            ("STOREFRONT_RECORD_BACKEND", "memory"),
            ("STOREFRONT_SESSION_DAYS", "0"),
        ]))
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "STOREFRONT_SESSION_DAYS")
        );
    }
}
