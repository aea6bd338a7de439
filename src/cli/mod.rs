// CLI module for swcache

use clap::Parser;

/// swcache - Service-worker style caching reverse proxy
#[derive(Parser, Debug)]
#[command(name = "swcache", version, about, long_about = None)]
pub struct Args {
    /// Path to the config file (default: ~/.swcache/config.toml)
    #[arg(long)]
    pub config: Option<String>,
}
