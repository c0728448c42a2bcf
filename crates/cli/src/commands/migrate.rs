//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! ce-cli migrate
//! ```
//!
//! Applies, in order:
//!
//! 1. The embedded `marketplace` schema migrations from `crates/store/migrations/`
//! 2. The storefront session table (`tower_sessions.session`)
//! 3. The admin session table (`admin.session`)
//!
//! Every step is idempotent.

use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use coach_exchange_admin::middleware::admin_session_store;
use coach_exchange_store::postgres::run_migrations;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Session table error: {0}")]
    Sessions(#[from] sqlx::Error),

    #[error("Invalid session store: {0}")]
    SessionStore(String),
}

/// Run all migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a step fails.
pub async fn all() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running marketplace migrations...");
    run_migrations(&pool).await.map_err(MigrationError::from)?;

    tracing::info!("Creating storefront session table...");
    PostgresStore::new(pool.clone())
        .migrate()
        .await
        .map_err(MigrationError::from)?;

    tracing::info!("Creating admin session table...");
    admin_session_store(pool)
        .map_err(MigrationError::SessionStore)?
        .migrate()
        .await
        .map_err(MigrationError::from)?;

    tracing::info!("Migrations complete!");
    Ok(())
}
