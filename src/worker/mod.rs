//! The resource cache router.
//!
//! [`CacheWorker`] owns the lifecycle of the two cache partitions and
//! decides, per request, whether to serve from cache, network, or both.
//! Lifecycle mirrors a service worker's: install (pre-cache), activate
//! (prune stale partitions), then active serving. The hosting process must
//! run install to completion, then activate, before serving traffic.

use crate::cache::{CacheStorage, StoredResponse};
use crate::classify::classify;
use crate::config::CacheConfig;
use crate::error::{Result, WorkerError};
use crate::metrics;
use crate::net::NetworkClient;
use crate::request::FetchRequest;
use crate::strategy::{self, PartitionRole, Strategy};
use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use futures::future::join_all;
use serde_json::Value;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

/// Recognized control message that triggers an on-demand eviction pass.
pub const CLEAN_CACHE_MESSAGE: &str = "CLEAN_CACHE";

/// What became of an intercepted request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// A strategy resolved the request.
    Handled(StoredResponse),
    /// Not ours to handle: forward verbatim, no strategy, no synthetic
    /// response.
    PassThrough,
}

#[derive(Clone)]
pub struct CacheWorker {
    config: CacheConfig,
    origin: Url,
    storage: CacheStorage,
    client: NetworkClient,
}

impl CacheWorker {
    pub fn new(config: CacheConfig, origin: Url, storage: CacheStorage, client: NetworkClient) -> Self {
        Self {
            config,
            origin,
            storage,
            client,
        }
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Install phase: open both partitions, populate the static partition
    /// with the fixed asset list, then best-effort pre-populate the dynamic
    /// partition. A missing static asset fails the whole install; dynamic
    /// pre-cache failures are isolated per asset.
    pub async fn install(&self) -> Result<()> {
        info!("Worker installing");
        self.storage.open(&self.config.static_partition).await;
        self.storage.open(&self.config.dynamic_partition).await;

        for path in &self.config.static_precache {
            let url = self.origin.join(path)?;
            let req = FetchRequest::get(url);
            let response = self
                .client
                .fetch(&req)
                .await
                .map_err(|err| {
                    warn!(path = %path, "Static pre-cache fetch failed: {}", err);
                    WorkerError::Precache(path.clone())
                })?;
            if !response.is_success() {
                warn!(path = %path, status = %response.status, "Static pre-cache asset unavailable");
                return Err(WorkerError::Precache(path.clone()));
            }
            self.storage
                .put(&self.config.static_partition, &req.identity(), response)
                .await;
        }
        info!(
            "Pre-cached {} static assets into {}",
            self.config.static_precache.len(),
            self.config.static_partition
        );

        // Each dynamic pre-fetch is attempted independently; one failure
        // does not abort the others.
        let attempts = self.config.dynamic_precache.iter().map(|raw| async move {
            let url = match Url::parse(raw) {
                Ok(url) => url,
                Err(err) => {
                    warn!(url = %raw, "Skipping unparseable pre-cache URL: {}", err);
                    return false;
                }
            };
            let req = FetchRequest::get(url);
            match self.client.fetch(&req).await {
                Ok(response) if response.is_success() => {
                    self.storage
                        .put(&self.config.dynamic_partition, &req.identity(), response)
                        .await;
                    true
                }
                Ok(response) => {
                    warn!(url = %raw, status = %response.status, "Failed to pre-cache");
                    false
                }
                Err(err) => {
                    warn!(url = %raw, "Failed to pre-cache: {}", err);
                    false
                }
            }
        });
        let cached = join_all(attempts).await.into_iter().filter(|ok| *ok).count();
        info!(
            "Pre-cached {}/{} dynamic assets into {}",
            cached,
            self.config.dynamic_precache.len(),
            self.config.dynamic_partition
        );

        self.update_entry_gauges().await;
        info!("Worker installation complete");
        Ok(())
    }

    /// Activate phase: delete every partition whose name is not one of the
    /// current static/dynamic names, completing version migration.
    pub async fn activate(&self) {
        info!("Worker activating");
        for name in self.storage.partition_names().await {
            if name != self.config.static_partition && name != self.config.dynamic_partition {
                info!("Deleting old cache partition: {}", name);
                self.storage.delete_partition(&name).await;
            }
        }
        info!("Worker activation complete");
    }

    /// Route one intercepted request. Non-GET methods and browser-extension
    /// schemes are never touched by a strategy.
    pub async fn handle_fetch(&self, req: &FetchRequest) -> FetchOutcome {
        if req.method != Method::GET || req.is_extension_scheme() {
            return FetchOutcome::PassThrough;
        }

        let kind = classify(req);
        let (chosen, role) = Strategy::for_kind(kind);
        let partition = self.partition_name(role);
        debug!(url = %req.url, ?kind, strategy = chosen.name(), partition, "Dispatching request");

        let response = match chosen {
            Strategy::CacheFirst => {
                strategy::cache_first(&self.storage, &self.client, req, partition).await
            }
            Strategy::NetworkFirst => {
                strategy::network_first(&self.storage, &self.client, req, partition).await
            }
            Strategy::StaleWhileRevalidate => {
                strategy::stale_while_revalidate(&self.storage, &self.client, req, partition).await
            }
        };
        FetchOutcome::Handled(response)
    }

    /// Forward a pass-through request to the network verbatim.
    pub async fn pass_through(
        &self,
        req: &FetchRequest,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<StoredResponse> {
        self.client
            .forward(req.method.clone(), req.url.clone(), headers, body)
            .await
    }

    /// Handle a control message from a client. Only the cache-clean command
    /// is recognized; any other shape is ignored.
    pub async fn handle_message(&self, message: &Value) {
        match message.get("type").and_then(Value::as_str) {
            Some(CLEAN_CACHE_MESSAGE) => {
                self.clean_dynamic_cache().await;
            }
            other => {
                debug!(message_type = ?other, "Ignoring unrecognized worker message");
            }
        }
    }

    /// Eviction pass: when the dynamic partition exceeds its ceiling,
    /// delete the oldest-inserted entries down to the ceiling. Insertion
    /// order is the documented policy (not LRU: lookups do not promote).
    /// Returns the number of entries removed.
    pub async fn clean_dynamic_cache(&self) -> usize {
        let partition = &self.config.dynamic_partition;
        let identities = self.storage.identities_by_insertion(partition).await;
        let ceiling = self.config.max_dynamic_entries;

        if identities.len() <= ceiling {
            metrics::update_cache_entries(partition, identities.len());
            return 0;
        }

        let excess = identities.len() - ceiling;
        for identity in &identities[..excess] {
            self.storage.delete_entry(partition, identity).await;
        }
        metrics::record_evictions(partition, excess);
        self.update_entry_gauges().await;
        info!("Cleaned {} old cache entries from {}", excess, partition);
        excess
    }

    /// Spawn the recurring eviction job. The returned handle must be
    /// aborted by the host on teardown.
    pub fn spawn_eviction_task(&self) -> JoinHandle<()> {
        let worker = self.clone();
        let period = Duration::from_secs(self.config.eviction_interval_seconds);
        info!("Scheduling eviction pass every {:?}", period);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // interval fires immediately; the first pass should wait a
            // full period after startup
            ticker.tick().await;
            loop {
                ticker.tick().await;
                worker.clean_dynamic_cache().await;
            }
        })
    }

    fn partition_name(&self, role: PartitionRole) -> &str {
        match role {
            PartitionRole::Static => &self.config.static_partition,
            PartitionRole::Dynamic => &self.config.dynamic_partition,
        }
    }

    async fn update_entry_gauges(&self) {
        for partition in [&self.config.static_partition, &self.config.dynamic_partition] {
            let count = self.storage.entry_count(partition).await;
            metrics::update_cache_entries(partition, count);
        }
    }
}
