//! Caching strategies.
//!
//! Each strategy resolves one request against one named partition and always
//! produces a response: network errors are expected, handled locally, and
//! never propagated to the caller. The only user-visible failure is the
//! synthetic offline response when both the network and the cache miss.
//!
//! - **Cache-First** serves from cache when present, network otherwise,
//!   storing successful network results for future reuse.
//! - **Network-First** always attempts the network exactly once, falling
//!   back to cache on failure.
//! - **Stale-While-Revalidate** returns cached content immediately while
//!   refreshing the cache in the background.

use crate::cache::{CacheStorage, StoredResponse};
use crate::classify::ResourceKind;
use crate::metrics;
use crate::net::NetworkClient;
use crate::request::FetchRequest;
use tracing::{debug, warn};

/// The three ways a request can be resolved against a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

/// Which of the two live partitions a strategy operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionRole {
    /// Long-lived, hand-picked assets.
    Static,
    /// Runtime-populated, bounded by eviction passes.
    Dynamic,
}

impl Strategy {
    /// The routing table: resource kind to (strategy, partition).
    ///
    /// Navigations go network-first so a page always reflects the latest
    /// deployed markup; a stale cached document could reference bundle
    /// assets that no longer exist.
    pub fn for_kind(kind: ResourceKind) -> (Strategy, PartitionRole) {
        match kind {
            ResourceKind::DocumentNavigation => (Strategy::NetworkFirst, PartitionRole::Dynamic),
            ResourceKind::StaticAsset => (Strategy::CacheFirst, PartitionRole::Static),
            ResourceKind::ImageAsset => (Strategy::CacheFirst, PartitionRole::Dynamic),
            ResourceKind::FontAsset => (Strategy::CacheFirst, PartitionRole::Dynamic),
            ResourceKind::ApiRequest => (Strategy::NetworkFirst, PartitionRole::Dynamic),
            ResourceKind::Other => (Strategy::StaleWhileRevalidate, PartitionRole::Dynamic),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cache_first",
            Strategy::NetworkFirst => "network_first",
            Strategy::StaleWhileRevalidate => "stale_while_revalidate",
        }
    }
}

/// Serve from cache when present; otherwise fetch, keep a copy of a
/// successful response, and return it. Network failure with nothing cached
/// yields the offline response.
pub async fn cache_first(
    storage: &CacheStorage,
    client: &NetworkClient,
    req: &FetchRequest,
    partition: &str,
) -> StoredResponse {
    let identity = req.identity();

    if let Some(cached) = storage.match_entry(partition, &identity).await {
        metrics::record_cache_lookup(partition, true);
        metrics::record_strategy_response("cache_first", "cache");
        return cached;
    }
    metrics::record_cache_lookup(partition, false);

    match client.fetch(req).await {
        Ok(response) => {
            metrics::record_network_fetch(true);
            if response.is_success() {
                storage.put(partition, &identity, response.clone()).await;
                metrics::record_cache_store(partition);
            }
            metrics::record_strategy_response("cache_first", "network");
            response
        }
        Err(err) => {
            warn!(url = %req.url, "Cache first failed: {}", err);
            metrics::record_network_fetch(false);
            metrics::record_strategy_response("cache_first", "offline");
            StoredResponse::offline()
        }
    }
}

/// Attempt the network exactly once; keep a copy of a successful response.
/// On failure fall back to the cached entry, then to the offline response.
pub async fn network_first(
    storage: &CacheStorage,
    client: &NetworkClient,
    req: &FetchRequest,
    partition: &str,
) -> StoredResponse {
    let identity = req.identity();

    match client.fetch(req).await {
        Ok(response) => {
            metrics::record_network_fetch(true);
            if response.is_success() {
                storage.put(partition, &identity, response.clone()).await;
                metrics::record_cache_store(partition);
            }
            metrics::record_strategy_response("network_first", "network");
            response
        }
        Err(err) => {
            warn!(url = %req.url, "Network failed, trying cache: {}", err);
            metrics::record_network_fetch(false);
            match storage.match_entry(partition, &identity).await {
                Some(cached) => {
                    metrics::record_cache_lookup(partition, true);
                    metrics::record_strategy_response("network_first", "cache");
                    cached
                }
                None => {
                    metrics::record_cache_lookup(partition, false);
                    metrics::record_strategy_response("network_first", "offline");
                    StoredResponse::offline()
                }
            }
        }
    }
}

/// Return the cached entry immediately and refresh it from the network in a
/// background task. With nothing cached this degrades to a one-shot network
/// fetch. Background failures are logged and swallowed; the caller already
/// holds its response.
pub async fn stale_while_revalidate(
    storage: &CacheStorage,
    client: &NetworkClient,
    req: &FetchRequest,
    partition: &str,
) -> StoredResponse {
    let identity = req.identity();

    let Some(cached) = storage.match_entry(partition, &identity).await else {
        metrics::record_cache_lookup(partition, false);
        return match client.fetch(req).await {
            Ok(response) => {
                metrics::record_network_fetch(true);
                if response.is_success() {
                    storage.put(partition, &identity, response.clone()).await;
                    metrics::record_cache_store(partition);
                }
                metrics::record_strategy_response("stale_while_revalidate", "network");
                response
            }
            Err(err) => {
                warn!(url = %req.url, "Revalidation fetch failed with empty cache: {}", err);
                metrics::record_network_fetch(false);
                metrics::record_strategy_response("stale_while_revalidate", "offline");
                StoredResponse::offline()
            }
        };
    };

    metrics::record_cache_lookup(partition, true);
    metrics::record_strategy_response("stale_while_revalidate", "cache");

    // Refresh in the background; the task owns its handles and outlives
    // this call. Its completion is deliberately not awaited.
    let storage = storage.clone();
    let client = client.clone();
    let req = req.clone();
    let partition = partition.to_string();
    tokio::spawn(async move {
        match client.fetch(&req).await {
            Ok(response) if response.is_success() => {
                metrics::record_network_fetch(true);
                storage.put(&partition, &req.identity(), response).await;
                metrics::record_cache_store(&partition);
                debug!(url = %req.url, "Revalidated cache entry");
            }
            Ok(response) => {
                metrics::record_network_fetch(true);
                debug!(url = %req.url, status = %response.status, "Revalidation skipped non-success response");
            }
            Err(err) => {
                metrics::record_network_fetch(false);
                warn!(url = %req.url, "Background fetch failed: {}", err);
            }
        }
    });

    cached
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_table_is_exhaustive() {
        let kinds = [
            ResourceKind::DocumentNavigation,
            ResourceKind::StaticAsset,
            ResourceKind::ImageAsset,
            ResourceKind::FontAsset,
            ResourceKind::ApiRequest,
            ResourceKind::Other,
        ];
        for kind in kinds {
            // Every kind resolves to some strategy without panicking.
            let _ = Strategy::for_kind(kind);
        }
    }

    #[test]
    fn only_static_assets_use_the_static_partition() {
        for kind in [
            ResourceKind::DocumentNavigation,
            ResourceKind::ImageAsset,
            ResourceKind::FontAsset,
            ResourceKind::ApiRequest,
            ResourceKind::Other,
        ] {
            assert_eq!(Strategy::for_kind(kind).1, PartitionRole::Dynamic);
        }
        assert_eq!(
            Strategy::for_kind(ResourceKind::StaticAsset),
            (Strategy::CacheFirst, PartitionRole::Static)
        );
    }

    #[test]
    fn navigations_and_apis_are_network_first() {
        assert_eq!(
            Strategy::for_kind(ResourceKind::DocumentNavigation).0,
            Strategy::NetworkFirst
        );
        assert_eq!(
            Strategy::for_kind(ResourceKind::ApiRequest).0,
            Strategy::NetworkFirst
        );
    }
}
