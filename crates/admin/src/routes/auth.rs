//! Admin authentication handlers.

use axum::{Json, extract::State, http::StatusCode};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::Result;
use crate::middleware::{RequireAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<CurrentAdmin>> {
    let admin = state
        .auth()
        .login(&request.email, &SecretString::from(request.password))
        .inspect_err(|_| tracing::warn!("Failed admin login attempt"))?;

    set_current_admin(&session, &admin).await?;
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(admin.email.to_string()),
            ..Default::default()
        }));
    });

    tracing::info!(admin = %admin.email, "Admin logged in");
    Ok(Json(admin))
}

/// `POST /auth/logout`
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_admin(&session).await?;
    session.flush().await?;
    sentry::configure_scope(|scope| scope.set_user(None));
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /auth/me`
pub async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<CurrentAdmin> {
    Json(admin)
}
