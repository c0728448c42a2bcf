//! Customer authentication handlers.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{Duration, Utc};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireUser, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::Registration;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/register` - create an account and log it in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<CurrentUser>)> {
    let registration = Registration {
        name: request.name,
        email: request.email,
        password: SecretString::from(request.password),
    };
    let user = state.auth().register(&registration).await?;

    let current = start_session(&state, &session, &user).await?;
    Ok((StatusCode::CREATED, Json(current)))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<CurrentUser>> {
    let user = state
        .auth()
        .login(&request.email, &SecretString::from(request.password))
        .await?;

    tracing::info!(user_id = %user.id, "Customer logged in");
    Ok(Json(start_session(&state, &session, &user).await?))
}

/// `POST /auth/logout` - drop the whole session.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    session.flush().await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /auth/me`
pub async fn me(RequireUser(user): RequireUser) -> Json<CurrentUser> {
    Json(user)
}

async fn start_session(
    state: &AppState,
    session: &Session,
    user: &coach_exchange_core::User,
) -> Result<CurrentUser> {
    let lifetime = Duration::days(state.config().session_days);
    let current = CurrentUser::for_user(user, Utc::now(), lifetime);
    set_current_user(session, &current).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(current)
}
