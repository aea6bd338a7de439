// HTTP request handlers

use super::routes::AppState;
use crate::request::FetchRequest;
use crate::worker::FetchOutcome;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

// Pass-through bodies are buffered before forwarding; bound the buffer.
const MAX_FORWARD_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();
    let mut overall_status = HealthStatus::Healthy;

    let cache = state.worker.config();
    let storage = state.worker.storage();

    let static_count = storage.entry_count(&cache.static_partition).await;
    checks.insert(
        "static_partition".to_string(),
        HealthCheck {
            status: "ok".to_string(),
            message: format!("{}: {} entries", cache.static_partition, static_count),
        },
    );

    // The dynamic ceiling is soft; exceeding it between eviction passes is
    // legal but worth surfacing.
    let dynamic_count = storage.entry_count(&cache.dynamic_partition).await;
    let dynamic_check = if dynamic_count > cache.max_dynamic_entries {
        overall_status = HealthStatus::Degraded;
        HealthCheck {
            status: "warning".to_string(),
            message: format!(
                "{}: {} entries exceeds ceiling {}",
                cache.dynamic_partition, dynamic_count, cache.max_dynamic_entries
            ),
        }
    } else {
        HealthCheck {
            status: "ok".to_string(),
            message: format!("{}: {} entries", cache.dynamic_partition, dynamic_count),
        }
    };
    checks.insert("dynamic_partition".to_string(), dynamic_check);

    checks.insert(
        "upstream".to_string(),
        HealthCheck {
            status: "ok".to_string(),
            message: format!("Origin: {}", state.origin),
        },
    );

    checks.insert(
        "configuration".to_string(),
        HealthCheck {
            status: "ok".to_string(),
            message: format!(
                "Eviction every {}s, dynamic ceiling {}",
                state.config.cache.eviction_interval_seconds, cache.max_dynamic_entries
            ),
        },
    );

    Json(HealthResponse {
        status: overall_status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// The message protocol endpoint. Recognized commands run; anything else is
/// silently ignored. Either way the sender gets a 202 (there is no reply
/// channel in the protocol).
pub async fn message_handler(
    State(state): State<AppState>,
    Json(message): Json<Value>,
) -> StatusCode {
    state.worker.handle_message(&message).await;
    StatusCode::ACCEPTED
}

/// The fetch-interception point: every non-control request lands here.
pub async fn proxy_handler(State(state): State<AppState>, req: Request) -> Response {
    let (parts, body) = req.into_parts();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = match state.origin.join(path_and_query) {
        Ok(url) => url,
        Err(err) => {
            warn!(path = path_and_query, "Rejecting unmappable request path: {}", err);
            return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
        }
    };

    let mut fetch_req = FetchRequest::new(parts.method.clone(), url);
    if let Some(mode) = header_value(&parts.headers, "sec-fetch-mode") {
        fetch_req = fetch_req.with_mode(mode);
    }
    if let Some(dest) = header_value(&parts.headers, "sec-fetch-dest") {
        fetch_req = fetch_req.with_destination(dest);
    }

    match state.worker.handle_fetch(&fetch_req).await {
        FetchOutcome::Handled(stored) => stored.into_response(),
        FetchOutcome::PassThrough => forward(&state, &fetch_req, parts.headers, body).await,
    }
}

async fn forward(
    state: &AppState,
    fetch_req: &FetchRequest,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let bytes = match axum::body::to_bytes(body, MAX_FORWARD_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(url = %fetch_req.url, "Failed to buffer pass-through body: {}", err);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response();
        }
    };

    match state.worker.pass_through(fetch_req, headers, bytes).await {
        Ok(stored) => stored.into_response(),
        Err(err) => {
            warn!(url = %fetch_req.url, "Pass-through forwarding failed: {}", err);
            (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
