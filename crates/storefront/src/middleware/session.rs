//! Session middleware configuration.
//!
//! The store is `PostgreSQL` when the record backend is, in-memory otherwise.
//! The `PostgreSQL` sessions table is created by `ce-cli migrate`.

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "ce_session";

/// Create the session layer over `store`.
///
/// Sessions expire after `STOREFRONT_SESSION_DAYS` of inactivity; the
/// cookie is `Secure` when the base URL is HTTPS.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &StorefrontConfig) -> SessionManagerLayer<S>
where
    S: SessionStore,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::days(config.session_days),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
