//! Configuration data structures for the swcache proxy.
//!
//! This module defines the schema for the application settings: the HTTP
//! server, the upstream origin being shielded, the cache partitions and
//! their pre-cache lists, and logging.

use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, workers).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream origin settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Cache partition and eviction settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8080`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads for the Axum server.
    /// Default: Number of logical CPU cores.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Settings for the upstream origin the proxy fronts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Origin URL that relative request paths resolve against.
    /// Default: `http://127.0.0.1:3000`
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Connection establishment timeout in seconds. There is deliberately
    /// no overall request timeout: a slow upstream fetch delays the
    /// network-dependent branch of a strategy indefinitely.
    /// Default: `10`
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Maximum number of idle connections to keep in the HTTP pool.
    /// Default: `10`
    #[serde(default = "default_pool_size")]
    pub pool_max_idle_per_host: usize,
}

/// Settings for the cache partitions, pre-cache lists and eviction.
///
/// Partition names are a versioned contract: bumping the version suffix and
/// restarting is the supported invalidation mechanism for pre-cached assets,
/// because activation deletes every partition not matching the current names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Name of the static partition (long-lived, hand-picked assets).
    /// Default: `karf7-static-v1.0.0`
    #[serde(default = "default_static_partition")]
    pub static_partition: String,

    /// Name of the dynamic partition (runtime-populated, bounded).
    /// Default: `karf7-dynamic-v1.0.0`
    #[serde(default = "default_dynamic_partition")]
    pub dynamic_partition: String,

    /// Soft ceiling on dynamic partition entries; enforced only by eviction
    /// passes, so the count may transiently exceed it between passes.
    /// Default: `50`
    #[serde(default = "default_max_dynamic_entries")]
    pub max_dynamic_entries: usize,

    /// Period of the recurring eviction pass, in seconds.
    /// Default: `86400` (24 hours)
    #[serde(default = "default_eviction_interval")]
    pub eviction_interval_seconds: u64,

    /// Origin-relative paths populated into the static partition at install.
    /// Every entry must resolve on the upstream or install fails.
    #[serde(default = "default_static_precache")]
    pub static_precache: Vec<String>,

    /// Absolute URLs best-effort pre-populated into the dynamic partition at
    /// install. Individual failures are tolerated.
    #[serde(default = "default_dynamic_precache")]
    pub dynamic_precache: Vec<String>,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `compact`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Legacy combined partition name, reserved by the versioned naming contract.
/// No current logic populates it; activation removes it like any other stale
/// partition.
pub const LEGACY_PARTITION: &str = "karf7-v1.0.0";

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            connect_timeout_seconds: default_connect_timeout(),
            pool_max_idle_per_host: default_pool_size(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            static_partition: default_static_partition(),
            dynamic_partition: default_dynamic_partition(),
            max_dynamic_entries: default_max_dynamic_entries(),
            eviction_interval_seconds: default_eviction_interval(),
            static_precache: default_static_precache(),
            dynamic_precache: default_dynamic_precache(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Helper functions for serde defaults and shared constants

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_origin() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_pool_size() -> usize {
    10
}

fn default_static_partition() -> String {
    "karf7-static-v1.0.0".to_string()
}

fn default_dynamic_partition() -> String {
    "karf7-dynamic-v1.0.0".to_string()
}

fn default_max_dynamic_entries() -> usize {
    50
}

fn default_eviction_interval() -> u64 {
    24 * 60 * 60
}

fn default_static_precache() -> Vec<String> {
    vec![
        "/images/KARF7_LOGO.png".to_string(),
        "/manifest.json".to_string(),
    ]
}

fn default_dynamic_precache() -> Vec<String> {
    vec![
        "https://images.pexels.com/photos/4342494/pexels-photo-4342494.jpeg".to_string(),
        "https://fonts.googleapis.com/css2".to_string(),
        "https://fonts.gstatic.com".to_string(),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
