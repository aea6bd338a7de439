// Outbound network access for the cache worker

use crate::cache::StoredResponse;
use crate::config::UpstreamConfig;
use crate::error::{Result, WorkerError};
use crate::request::FetchRequest;
use axum::http::header::HOST;
use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Thin wrapper over a pooled `reqwest::Client`.
///
/// Only connection establishment is bounded; there is intentionally no
/// overall request timeout, so a slow upstream delays the network-dependent
/// branch of a strategy for as long as the upstream takes.
#[derive(Clone)]
pub struct NetworkClient {
    http: Client,
}

impl NetworkClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| WorkerError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created upstream HTTP client with connection pooling and keep-alive");

        Ok(Self { http })
    }

    /// Fetch a request from the network and snapshot the full response.
    pub async fn fetch(&self, req: &FetchRequest) -> Result<StoredResponse> {
        let response = self
            .http
            .request(req.method.clone(), req.url.clone())
            .send()
            .await?;

        Self::snapshot(response).await
    }

    /// Forward a request verbatim (method, headers, body) without any
    /// caching involvement. Used for pass-through traffic.
    pub async fn forward(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<StoredResponse> {
        let response = self
            .http
            .request(method, url)
            .headers(outbound_headers(headers))
            .body(body)
            .send()
            .await?;

        Self::snapshot(response).await
    }

    async fn snapshot(response: reqwest::Response) -> Result<StoredResponse> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(StoredResponse::new(status, headers, body))
    }
}

/// Drop headers that describe the inbound connection rather than the
/// request itself; reqwest derives Host and Content-Length from the target
/// URL and body.
fn outbound_headers(mut headers: HeaderMap) -> HeaderMap {
    headers.remove(HOST);
    headers.remove(axum::http::header::CONTENT_LENGTH);
    headers.remove(axum::http::header::CONNECTION);
    headers.remove(axum::http::header::TRANSFER_ENCODING);
    headers
}
