//! Stored response and cache entry models.

use axum::http::header::{
    HeaderMap, HeaderName, CONNECTION, CONTENT_LENGTH, TE, TRAILER, TRANSFER_ENCODING, UPGRADE,
};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// A response snapshot as kept in a cache partition: status, headers, body.
#[derive(Debug, Clone)]
pub struct StoredResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl StoredResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers: strip_hop_by_hop(headers),
            body,
        }
    }

    /// The one user-visible failure shape: produced when both the network
    /// and the cache come up empty.
    pub fn offline() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain"),
        );
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            headers,
            body: Bytes::from_static(b"Offline"),
        }
    }

    /// Only successful responses are worth keeping for reuse.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl IntoResponse for StoredResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        for (name, value) in &self.headers {
            response.headers_mut().insert(name.clone(), value.clone());
        }
        response
    }
}

/// A single (request identity, response) pair inside a partition.
///
/// `seq` is a process-wide monotonic counter assigned at insertion;
/// overwrites get a fresh value, so ordering entries by `seq` yields
/// insertion order with re-puts moved to the back.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub response: StoredResponse,
    pub inserted_at: DateTime<Utc>,
    pub seq: u64,
}

// Hop-by-hop headers describe a single transport link and must not be
// replayed from cache. Content-Length is recomputed from the stored body.
const HOP_BY_HOP: [HeaderName; 6] = [
    CONNECTION,
    CONTENT_LENGTH,
    TE,
    TRAILER,
    TRANSFER_ENCODING,
    UPGRADE,
];

fn strip_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers.remove("proxy-authenticate");
    headers.remove("proxy-authorization");
    headers
}
