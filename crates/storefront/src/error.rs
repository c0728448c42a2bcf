//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`. Clients always get a JSON body:
//!
//! ```json
//! {"error": "Please correct the highlighted fields", "fields": {"price": ["must be a whole number"]}}
//! ```
//!
//! `fields` is present only for validation failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use coach_exchange_core::ValidationError;
use coach_exchange_store::multipart::FormError;
use coach_exchange_store::{StoreError, SubmissionError};

use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Record store operation failed.
    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    /// Listing submission failed.
    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    /// Multipart body could not be decoded.
    #[error("Form error: {0}")]
    Form(#[from] FormError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Request fields failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

const VALIDATION_MESSAGE: &str = "Please correct the highlighted fields";

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Store(_)
                | Self::Session(_)
                | Self::Internal(_)
                | Self::Submission(
                    SubmissionError::Store(_) | SubmissionError::Upload(_)
                )
                | Self::Auth(AuthError::Store(_) | AuthError::PasswordHash(_))
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Store(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Submission(err) => match err {
                SubmissionError::Validation(_) => StatusCode::BAD_REQUEST,
                SubmissionError::Upload(_) => StatusCode::BAD_GATEWAY,
                SubmissionError::NotFound => StatusCode::NOT_FOUND,
                SubmissionError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Form(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Auth(err) => match err {
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::Store(_) | AuthError::PasswordHash(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// The field errors to show next to the form, if any.
    const fn fields(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(errors)
            | Self::Form(FormError::Validation(errors))
            | Self::Submission(SubmissionError::Validation(errors))
            | Self::Auth(AuthError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }

    // Don't expose internal error details to clients
    fn client_message(&self) -> String {
        if self.fields().is_some() {
            return VALIDATION_MESSAGE.to_string();
        }
        match self {
            Self::Submission(SubmissionError::Upload(_)) => {
                "Image upload failed. Please try again.".to_string()
            }
            Self::Submission(SubmissionError::NotFound) => "Listing not found".to_string(),
            Self::Form(FormError::Read(_)) => "Malformed form data".to_string(),
            Self::Auth(AuthError::InvalidCredentials) => "Invalid email or password".to_string(),
            Self::Auth(AuthError::UserAlreadyExists) => {
                "This email is already registered.".to_string()
            }
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(message) => message.clone(),
            _ => "Operation failed. Please try again later.".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = match self.fields() {
            Some(fields) => json!({ "error": self.client_message(), "fields": fields }),
            None => json!({ "error": self.client_message() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after a successful login.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Listing".to_string());
        assert_eq!(err.to_string(), "Not found: Listing");
    }

    #[tokio::test]
    async fn test_validation_errors_carry_fields() {
        let err = AppError::Submission(SubmissionError::Validation(ValidationError::single(
            "price",
            "must be a whole number",
        )));

        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], VALIDATION_MESSAGE);
        assert_eq!(body["fields"]["price"][0], "must be a whole number");
    }

    #[tokio::test]
    async fn test_auth_messages() {
        let (status, body) = body_json(AppError::Auth(AuthError::UserAlreadyExists)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "This email is already registered.");

        let (status, body) = body_json(AppError::Auth(AuthError::InvalidCredentials)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let err = AppError::Store(StoreError::Backend("connection refused".to_string()));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.get("fields").is_none());
        assert!(!body["error"].as_str().unwrap().contains("connection refused"));
    }
}
