// Configuration module

mod models;

pub use models::*;

use crate::error::{Result, WorkerError};
use config::{Config, Environment, File};
use std::path::PathBuf;
use url::Url;

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest)
    /// 2. Config file
    /// 3. Defaults (lowest)
    ///
    /// `config_path` overrides the default config file location.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(str::to_string)
            .unwrap_or_else(Self::default_config_path);

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // Load from config file if it exists
            .add_source(File::with_name(&path).required(config_path.is_some()))
            // Override with environment variables (prefix: SWCACHE_)
            .add_source(Environment::with_prefix("SWCACHE").separator("__"))
            .build()
            .map_err(|e| WorkerError::Config(e.to_string()))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| WorkerError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse the configured upstream origin.
    pub fn origin_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.upstream.origin)?)
    }

    fn validate(&self) -> Result<()> {
        let origin = self.origin_url()?;
        if origin.cannot_be_a_base() {
            return Err(WorkerError::Config(format!(
                "upstream origin {} cannot serve as a base URL",
                self.upstream.origin
            )));
        }
        if self.cache.static_partition == self.cache.dynamic_partition {
            return Err(WorkerError::Config(
                "static and dynamic partitions must have distinct names".to_string(),
            ));
        }
        if self.cache.max_dynamic_entries == 0 {
            return Err(WorkerError::Config(
                "cache.max_dynamic_entries must be at least 1".to_string(),
            ));
        }
        if self.cache.eviction_interval_seconds == 0 {
            return Err(WorkerError::Config(
                "cache.eviction_interval_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn default_config_path() -> String {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".swcache")
            .join("config.toml")
            .to_string_lossy()
            .to_string()
    }
}
