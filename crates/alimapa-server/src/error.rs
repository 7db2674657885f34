use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced to API clients. Every variant renders as a JSON body with
/// a `message` field, the shape the map client expects.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("invalid request data: {0}")]
    InvalidBody(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": format!("{what} not found") })),
            )
                .into_response(),
            ApiError::InvalidBody(detail) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Invalid request data", "errors": [detail] })),
            )
                .into_response(),
            ApiError::Internal(detail) => {
                // Detail goes to the log, not to the client.
                error!(%detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Unexpected error" })),
                )
                    .into_response()
            }
        }
    }
}
