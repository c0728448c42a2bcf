//! Session middleware configuration for admin.
//!
//! Stricter than the storefront: `SameSite=Strict` and a shorter
//! inactivity expiry. With a `PostgreSQL` record backend the sessions live
//! in `admin.session`, created by `ce-cli migrate`.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "ce_admin_session";

/// The `PostgreSQL` session store in the `admin` schema.
///
/// # Errors
///
/// Returns the store's message if the schema or table name is rejected.
pub fn admin_session_store(pool: PgPool) -> Result<PostgresStore, String> {
    PostgresStore::new(pool)
        .with_schema_name("admin")
        .and_then(|store| store.with_table_name("session"))
        .map_err(|e| e.to_string())
}

/// Create the session layer over `store`.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &AdminConfig) -> SessionManagerLayer<S>
where
    S: SessionStore,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::hours(config.session_hours),
        ))
        .with_secure(config.is_secure())
        // SameSite=Strict for admin (stricter than storefront's Lax)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
