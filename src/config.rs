//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{CacheConfig, FetchMode};

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in milliseconds for entries without explicit TTL
    pub default_ttl_ms: u64,
    /// Maximum number of entries, `None` for unlimited
    pub max_items: Option<usize>,
    /// Maximum aggregate value size in bytes, `None` for unlimited
    pub max_size: Option<usize>,
    /// LRU eviction when true, FIFO when false
    pub enable_lru: bool,
    /// Whether hit/miss counters are kept
    pub enable_stats: bool,
    /// De-duplicate concurrent fetches for the same key
    pub single_flight: bool,
    /// HTTP server port
    pub server_port: u16,
    /// Background prune task interval in seconds
    pub prune_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_MAX_ITEMS` - Maximum entries, or `none` for unlimited (default: 1000)
    /// - `CACHE_MAX_SIZE_BYTES` - Maximum total size in bytes (default: unlimited)
    /// - `CACHE_ENABLE_LRU` - `true` for LRU, `false` for FIFO (default: true)
    /// - `CACHE_ENABLE_STATS` - Track hit/miss statistics (default: true)
    /// - `CACHE_SINGLE_FLIGHT` - Share in-flight fetches (default: false)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PRUNE_INTERVAL` - Prune frequency in seconds, at least 1 (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_items = match env::var("CACHE_MAX_ITEMS") {
            Ok(v) if v.eq_ignore_ascii_case("none") => None,
            Ok(v) => v.parse().ok().or(defaults.max_items),
            Err(_) => defaults.max_items,
        };

        Self {
            default_ttl_ms: env_or("CACHE_DEFAULT_TTL_MS", defaults.default_ttl_ms),
            max_items,
            max_size: env::var("CACHE_MAX_SIZE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok()),
            enable_lru: env_or("CACHE_ENABLE_LRU", defaults.enable_lru),
            enable_stats: env_or("CACHE_ENABLE_STATS", defaults.enable_stats),
            single_flight: env_or("CACHE_SINGLE_FLIGHT", defaults.single_flight),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            prune_interval: env_or("PRUNE_INTERVAL", defaults.prune_interval).max(1),
        }
    }

    /// Builds the cache options described by this configuration.
    pub fn cache_config(&self) -> CacheConfig {
        let mut config = CacheConfig::new()
            .default_ttl(Duration::from_millis(self.default_ttl_ms))
            .enable_lru(self.enable_lru)
            .enable_stats(self.enable_stats);

        if let Some(max_items) = self.max_items {
            config = config.max_items(max_items);
        }
        if let Some(max_size) = self.max_size {
            config = config.max_size(max_size);
        }
        if self.single_flight {
            config = config.fetch_mode(FetchMode::SingleFlight);
        }
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: 300_000,
            max_items: Some(1000),
            max_size: None,
            enable_lru: true,
            enable_stats: true,
            single_flight: false,
            server_port: 3000,
            prune_interval: 1,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
