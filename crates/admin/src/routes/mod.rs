//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness
//! GET    /health/ready                 - Record store reachable
//!
//! # Auth
//! POST   /auth/login                   - Login with the configured credentials
//! POST   /auth/logout                  - Logout
//! GET    /auth/me                      - Current admin
//!
//! # Everything below requires an admin session
//! GET    /api/dashboard                - Record counts
//!
//! GET    /api/listings?q=              - All listings, searchable
//! POST   /api/listings                 - Create (approved)
//! GET    /api/listings/{id}            - Detail
//! PUT    /api/listings/{id}            - Edit
//! DELETE /api/listings/{id}            - Delete
//! POST   /api/listings/{id}/approve    - Approve
//!
//! GET    /api/blogs                    - All posts
//! POST   /api/blogs                    - Create (unpublished)
//! GET    /api/blogs/{id}               - Detail
//! PUT    /api/blogs/{id}               - Edit
//! DELETE /api/blogs/{id}               - Delete
//! POST   /api/blogs/{id}/publish       - Toggle published
//!
//! GET    /api/leads?q=                 - Lead inbox
//! ```

pub mod auth;
pub mod blogs;
pub mod dashboard;
pub mod health;
pub mod leads;
pub mod listings;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use serde::Deserialize;

use crate::state::AppState;

/// Largest accepted create or edit body (all images together).
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// `?q=` on the admin lists.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

impl SearchParams {
    /// The query, empty when absent.
    #[must_use]
    pub fn query(&self) -> &str {
        self.q.as_deref().unwrap_or_default()
    }
}

/// Create the admin API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::index))
        .route("/listings", get(listings::index).post(listings::create))
        .route(
            "/listings/{id}",
            get(listings::show)
                .put(listings::update)
                .delete(listings::delete),
        )
        .route("/listings/{id}/approve", post(listings::approve))
        .route("/blogs", get(blogs::index).post(blogs::create))
        .route(
            "/blogs/{id}",
            get(blogs::show).put(blogs::update).delete(blogs::delete),
        )
        .route("/blogs/{id}/publish", post(blogs::toggle_publish))
        .route("/leads", get(leads::index))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .nest("/api", api_routes())
}
