//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mdr_render::RenderError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Required request field is missing or empty.
    #[error("invalid request: {0}")]
    BadRequest(String),

    /// Render pipeline error.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Internal failure outside the render pipeline.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({"error": message}))
            }
            Self::Render(e @ (RenderError::InvalidFormat(_) | RenderError::InvalidInput(_))) => {
                (StatusCode::BAD_REQUEST, json!({"error": e.to_string()}))
            }
            Self::Render(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": e.to_string()}),
            ),
            Self::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": message}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
