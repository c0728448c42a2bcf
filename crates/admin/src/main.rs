//! Coach Exchange Admin - internal administration panel.
//!
//! This binary serves the admin JSON API on port 3001.
//!
//! # Security
//!
//! Approves public submissions and edits every record. Bind it to a
//! private interface or put it behind an authenticating proxy.
//!
//! # Architecture
//!
//! - Axum web framework
//! - Record store: `PostgreSQL` (or in-memory for demos), chosen by config
//! - Object store for listing photos and blog covers
//! - tower-sessions, `SameSite=Strict`, sessions in the `admin` schema

#![cfg_attr(not(test), forbid(unsafe_code))]

use coach_exchange_admin::config::AdminConfig;
use coach_exchange_admin::middleware::{admin_session_store, create_session_layer};
use coach_exchange_admin::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tower_sessions::MemoryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            send_default_pii: true, // Admin panel can include PII for debugging
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = AdminConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "coach_exchange_admin=info,coach_exchange_store=info,tower_http=debug".into()
    });

    // JSON for structured log parsing in deployment, text locally
    let json_layer = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!config.log_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let backends = config
        .store
        .connect()
        .await
        .expect("Failed to connect store backends");

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p coach-exchange-cli -- migrate

    let state = AppState::new(config.clone(), &backends);

    let app = match backends.pool {
        Some(pool) => {
            let store = admin_session_store(pool).expect("Invalid admin session table");
            coach_exchange_admin::app(state, create_session_layer(store, &config))
        }
        None => {
            tracing::warn!("Using in-memory sessions; admin logins are lost on restart");
            coach_exchange_admin::app(
                state,
                create_session_layer(MemoryStore::default(), &config),
            )
        }
    }
    // Sentry layers (outermost for full request coverage)
    .layer(sentry_tower::NewSentryLayer::new_from_top())
    .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("admin listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
