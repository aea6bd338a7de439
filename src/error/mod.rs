// Error types for the swcache proxy

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Pre-cache failed for {0}")]
    Precache(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Convert WorkerError to HTTP responses for Axum. Strategy-level network
// failures never reach this path (they resolve to a cache fallback or the
// synthetic offline response inside the strategy); this covers the control
// endpoints and pass-through forwarding.
impl IntoResponse for WorkerError {
    fn into_response(self) -> Response {
        let (status, error_type) = match self {
            WorkerError::Network(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            WorkerError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, "invalid_request_error"),
            WorkerError::Config(_) | WorkerError::ConfigParsing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = json!({
            "type": "error",
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WorkerError>;
