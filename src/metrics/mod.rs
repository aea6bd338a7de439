// Metrics module for Prometheus observability

mod registry;

pub use registry::{
    gather_metrics, CACHE_ENTRIES, CACHE_OPERATIONS, EVICTIONS, NETWORK_FETCHES,
    STRATEGY_RESPONSES,
};

/// Helper to record a cache lookup result
pub fn record_cache_lookup(partition: &str, hit: bool) {
    let operation = if hit { "hit" } else { "miss" };
    CACHE_OPERATIONS
        .with_label_values(&[partition, operation])
        .inc();
}

/// Helper to record a cache write
pub fn record_cache_store(partition: &str) {
    CACHE_OPERATIONS
        .with_label_values(&[partition, "store"])
        .inc();
}

/// Helper to update the entry gauge for a partition
pub fn update_cache_entries(partition: &str, count: usize) {
    CACHE_ENTRIES
        .with_label_values(&[partition])
        .set(count as f64);
}

/// Helper to record entries removed by an eviction pass
pub fn record_evictions(partition: &str, removed: usize) {
    if removed > 0 {
        EVICTIONS
            .with_label_values(&[partition])
            .inc_by(removed as f64);
    }
}

/// Helper to record how a strategy satisfied a request
pub fn record_strategy_response(strategy: &str, source: &str) {
    STRATEGY_RESPONSES
        .with_label_values(&[strategy, source])
        .inc();
}

/// Helper to record an upstream fetch attempt
pub fn record_network_fetch(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    NETWORK_FETCHES.with_label_values(&[outcome]).inc();
}
