//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness
//! GET  /health/ready                   - Record store reachable
//!
//! # Listings
//! GET  /api/listings                   - Approved listings, filtered
//! GET  /api/listings/featured          - Newest three approved listings
//! GET  /api/listings/{slug}            - Approved listing detail
//! POST /api/listings                   - Submit a listing (login required)
//! POST /api/listings/{slug}/leads      - Inquiry about a listing
//!
//! # Blog
//! GET  /api/blogs                      - Published posts
//! GET  /api/blogs/{slug}               - Published post
//!
//! # Auth
//! POST /auth/register                  - Create account and log in
//! POST /auth/login                     - Login
//! POST /auth/logout                    - Logout
//! GET  /auth/me                        - Current customer
//! ```

pub mod auth;
pub mod blog;
pub mod health;
pub mod leads;
pub mod listings;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, submission_rate_limiter};
use crate::state::AppState;

/// Largest accepted listing submission (all images together).
pub const MAX_SUBMISSION_BYTES: usize = 50 * 1024 * 1024;

/// Create the auth routes router.
pub fn auth_routes(rate_limit: bool) -> Router<AppState> {
    let credentials = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));
    let credentials = if rate_limit {
        credentials.layer(auth_rate_limiter())
    } else {
        credentials
    };

    Router::new()
        .merge(credentials)
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the listing routes router.
pub fn listing_routes(rate_limit: bool) -> Router<AppState> {
    let submissions = Router::new()
        .route(
            "/",
            post(listings::create).layer(DefaultBodyLimit::max(MAX_SUBMISSION_BYTES)),
        )
        .route("/{slug}/leads", post(leads::create));
    let submissions = if rate_limit {
        submissions.layer(submission_rate_limiter())
    } else {
        submissions
    };

    Router::new()
        .route("/", get(listings::index))
        .route("/featured", get(listings::featured))
        .route("/{slug}", get(listings::show))
        .merge(submissions)
}

/// Create the blog routes router.
pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(blog::index))
        .route("/{slug}", get(blog::show))
}

/// Create all routes for the storefront.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/listings", listing_routes(rate_limit))
        .nest("/api/blogs", blog_routes())
        .nest("/auth", auth_routes(rate_limit))
}
