// Prometheus metrics registry and collectors

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_gauge_vec_with_registry, CounterVec, Encoder,
    GaugeVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Cache lookups and writes per partition
    pub static ref CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("cache_operations_total", "Total cache operations"),
        &["partition", "operation"], // operation: hit, miss, store
        REGISTRY
    ).unwrap();

    /// Current entry count per partition
    pub static ref CACHE_ENTRIES: GaugeVec = register_gauge_vec_with_registry!(
        Opts::new("cache_entries_current", "Current number of cache entries"),
        &["partition"],
        REGISTRY
    ).unwrap();

    /// Entries removed by eviction passes
    pub static ref EVICTIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("cache_evictions_total", "Total entries removed by eviction passes"),
        &["partition"],
        REGISTRY
    ).unwrap();

    /// Responses served, by strategy and how they were satisfied
    pub static ref STRATEGY_RESPONSES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("strategy_responses_total", "Total responses served per strategy"),
        &["strategy", "source"], // source: cache, network, offline
        REGISTRY
    ).unwrap();

    /// Upstream fetch attempts
    pub static ref NETWORK_FETCHES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("network_fetches_total", "Total upstream fetch attempts"),
        &["outcome"], // outcome: ok, error
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
