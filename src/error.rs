//! Error type for HTTP handlers.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::farm::InvalidStatus;

// ---

/// Handler error, rendered as `{ "error": ..., "code": ... }` JSON.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Nothing matched the request, e.g. a sensor with no history.
    #[error("{0}")]
    NotFound(String),

    /// A malformed body, or a parameter outside its accepted range.
    #[error("{0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<InvalidStatus> for AppError {
    fn from(e: InvalidStatus) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // ---
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => {
                tracing::debug!(error = %msg, "Rejected request");
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
