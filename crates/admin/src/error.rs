//! Unified error handling for admin.
//!
//! Same JSON body as the storefront: `{"error": message}` plus `fields` for
//! validation failures. Server-side failures go to Sentry.

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

use crate::services::AdminAuthError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Record store operation failed.
    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    /// Create or edit with uploads failed.
    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    /// Multipart body could not be decoded.
    #[error("Form error: {0}")]
    Form(#[from] FormError),

    /// Login failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AdminAuthError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Store(_)
                | Self::Session(_)
                | Self::Auth(AdminAuthError::PasswordHash(_))
                | Self::Submission(SubmissionError::Store(_) | SubmissionError::Upload(_))
        )
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Store(_) | Self::Session(_) | Self::Auth(AdminAuthError::PasswordHash(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Submission(SubmissionError::Validation(_)) | Self::Form(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Submission(SubmissionError::Upload(_)) => StatusCode::BAD_GATEWAY,
            Self::Submission(SubmissionError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Submission(SubmissionError::NotFound) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Auth(AdminAuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
        }
    }

    const fn fields(&self) -> Option<&ValidationError> {
        match self {
            Self::Form(FormError::Validation(errors))
            | Self::Submission(SubmissionError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }

    fn client_message(&self) -> String {
        match self {
            _ if self.fields().is_some() => "Please correct the highlighted fields".to_string(),
            Self::Submission(SubmissionError::Upload(_)) => {
                "Image upload failed. Please try again.".to_string()
            }
            Self::Submission(SubmissionError::NotFound) => "Record not found".to_string(),
            Self::Form(FormError::Read(_)) => "Malformed form data".to_string(),
            Self::Auth(AdminAuthError::InvalidCredentials) => {
                "Invalid email or password".to_string()
            }
            Self::NotFound(what) => format!("{what} not found"),
            _ => "Operation failed. Please try again later.".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
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

    #[tokio::test]
    async fn test_missing_cover_is_a_field_error() {
        let err = AppError::Submission(SubmissionError::Validation(ValidationError::single(
            "cover_image",
            "cover image is required",
        )));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"]["cover_image"][0], "cover image is required");
    }

    #[tokio::test]
    async fn test_not_found_names_the_record() {
        let (status, body) = body_json(AppError::NotFound("Blog".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Blog not found");
    }

    #[tokio::test]
    async fn test_store_failure_is_opaque() {
        let err = AppError::Store(StoreError::Backend("pool timed out".to_string()));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Operation failed. Please try again later.");
    }
}
