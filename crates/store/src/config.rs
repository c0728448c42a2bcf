//! Backend selection and shared environment helpers.
//!
//! # Environment Variables
//!
//! Record store (`{PREFIX}` is `STOREFRONT` or `ADMIN`):
//! - `{PREFIX}_RECORD_BACKEND` - `postgres` (default) or `memory`
//! - `{PREFIX}_DATABASE_URL` - `PostgreSQL` connection string, falls back to
//!   `DATABASE_URL`
//!
//! Object store:
//! - `OBJECT_STORE_BACKEND` - `hosted`, `local` (default) or `memory`
//! - `OBJECT_STORE_URL` - hosted storage base URL
//! - `OBJECT_STORE_SERVICE_KEY` - hosted storage service key (validated secret)
//! - `OBJECT_STORE_LOCAL_DIR` - directory for the local backend (default: `uploads`)
//! - `OBJECT_STORE_PUBLIC_BASE_URL` - URL prefix the local directory is
//!   served under (default: `/uploads`)

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;
use url::Url;

use crate::memory::MemoryRecordStore;
use crate::object::{HostedObjectStore, LocalObjectStore, MemoryObjectStore, ObjectStore};
use crate::postgres::{PgRecordStore, create_pool};
use crate::records::RecordStore;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Which record store to run against.
#[derive(Clone)]
pub enum RecordBackend {
    Postgres { database_url: SecretString },
    Memory,
}

impl std::fmt::Debug for RecordBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres { .. } => f
                .debug_struct("Postgres")
                .field("database_url", &"[REDACTED]")
                .finish(),
            Self::Memory => f.write_str("Memory"),
        }
    }
}

/// Which object store to upload images to.
#[derive(Clone)]
pub enum ObjectBackendConfig {
    Hosted {
        url: Url,
        service_key: SecretString,
    },
    Local {
        dir: PathBuf,
        public_base_url: String,
    },
    Memory,
}

impl std::fmt::Debug for ObjectBackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hosted { url, .. } => f
                .debug_struct("Hosted")
                .field("url", url)
                .field("service_key", &"[REDACTED]")
                .finish(),
            Self::Local {
                dir,
                public_base_url,
            } => f
                .debug_struct("Local")
                .field("dir", dir)
                .field("public_base_url", public_base_url)
                .finish(),
            Self::Memory => f.write_str("Memory"),
        }
    }
}

/// Record and object backend choice for one binary.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub records: RecordBackend,
    pub objects: ObjectBackendConfig,
}

/// Connected backends.
#[derive(Clone)]
pub struct Backends {
    pub records: Arc<dyn RecordStore>,
    pub objects: Arc<dyn ObjectStore>,
    /// The pool, when the record backend is `PostgreSQL` (sessions share it).
    pub pool: Option<PgPool>,
    /// Directory to serve under `/uploads`, when the object backend is local.
    pub local_upload_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Load from the process environment for the binary named by `prefix`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unknown backend names, missing required
    /// variables, or a weak service key.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        Self::load(prefix, &Env::process())
    }

    /// Load using `lookup` to read variables.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(
        prefix: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::load(prefix, &Env::new(lookup))
    }

    /// Load from an [`Env`]. The binaries call this while loading their
    /// own configuration.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn load<F>(prefix: &str, env: &Env<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_key = format!("{prefix}_RECORD_BACKEND");
        let records = match env.or_default(&backend_key, "postgres").as_str() {
            "postgres" => {
                let url_key = format!("{prefix}_DATABASE_URL");
                let database_url = env
                    .optional(&url_key)
                    .or_else(|| env.optional("DATABASE_URL"))
                    .ok_or(ConfigError::MissingEnvVar(url_key))?;
                RecordBackend::Postgres {
                    database_url: SecretString::from(database_url),
                }
            }
            "memory" => RecordBackend::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    backend_key,
                    format!("unknown record backend '{other}' (expected postgres or memory)"),
                ));
            }
        };

        let objects = match env.or_default("OBJECT_STORE_BACKEND", "local").as_str() {
            "hosted" => {
                let url = Url::parse(&env.required("OBJECT_STORE_URL")?).map_err(|e| {
                    ConfigError::InvalidEnvVar("OBJECT_STORE_URL".to_owned(), e.to_string())
                })?;
                if url.cannot_be_a_base() {
                    return Err(ConfigError::InvalidEnvVar(
                        "OBJECT_STORE_URL".to_owned(),
                        "must be an http(s) URL".to_owned(),
                    ));
                }
                ObjectBackendConfig::Hosted {
                    url,
                    service_key: env.validated_secret("OBJECT_STORE_SERVICE_KEY")?,
                }
            }
            "local" => ObjectBackendConfig::Local {
                dir: PathBuf::from(env.or_default("OBJECT_STORE_LOCAL_DIR", "uploads")),
                public_base_url: env.or_default("OBJECT_STORE_PUBLIC_BASE_URL", "/uploads"),
            },
            "memory" => ObjectBackendConfig::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "OBJECT_STORE_BACKEND".to_owned(),
                    format!("unknown object backend '{other}' (expected hosted, local or memory)"),
                ));
            }
        };

        Ok(Self { records, objects })
    }

    /// In-memory records and objects.
    #[must_use]
    pub const fn in_memory() -> Self {
        Self {
            records: RecordBackend::Memory,
            objects: ObjectBackendConfig::Memory,
        }
    }

    /// Build the configured backends, connecting to `PostgreSQL` if needed.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the database connection fails.
    pub async fn connect(&self) -> Result<Backends, sqlx::Error> {
        let (records, pool): (Arc<dyn RecordStore>, Option<PgPool>) = match &self.records {
            RecordBackend::Postgres { database_url } => {
                let pool = create_pool(database_url).await?;
                (Arc::new(PgRecordStore::new(pool.clone())), Some(pool))
            }
            RecordBackend::Memory => {
                tracing::warn!("Using in-memory record store; data is lost on restart");
                (Arc::new(MemoryRecordStore::new()), None)
            }
        };

        let (objects, local_upload_dir): (Arc<dyn ObjectStore>, Option<PathBuf>) =
            match &self.objects {
                ObjectBackendConfig::Hosted { url, service_key } => (
                    Arc::new(HostedObjectStore::new(url.clone(), service_key.clone())),
                    None,
                ),
                ObjectBackendConfig::Local {
                    dir,
                    public_base_url,
                } => (
                    Arc::new(LocalObjectStore::new(dir.clone(), public_base_url)),
                    Some(dir.clone()),
                ),
                ObjectBackendConfig::Memory => (Arc::new(MemoryObjectStore::new()), None),
            };

        tracing::info!(
            records = records.backend_name(),
            objects = objects.backend_name(),
            "Store backends ready"
        );

        Ok(Backends {
            records,
            objects,
            pool,
            local_upload_dir,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variables read through a lookup function.
///
/// `Env::process()` reads the real environment; tests pass a map.
pub struct Env<F> {
    lookup: F,
}

impl Env<fn(&str) -> Option<String>> {
    /// Read from the process environment.
    #[must_use]
    pub fn process() -> Self {
        fn read(key: &str) -> Option<String> {
            std::env::var(key).ok()
        }
        Self { lookup: read }
    }
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    pub const fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// An optional variable. Blank values count as unset.
    pub fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    /// A required variable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if unset.
    pub fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    pub fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the value does not parse.
    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => Ok(default),
        }
    }

    /// A required secret that passes [`validate_secret_strength`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if unset or weak.
    pub fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        validate_secret_strength(&value, key)?;
        Ok(SecretString::from(value))
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` naming `var_name`.
pub fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
