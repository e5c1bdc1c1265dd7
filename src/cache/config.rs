//! Cache Configuration Module
//!
//! Construction-time options for `MemoryCache`. Immutable once the cache is built.

use std::time::Duration;

/// Default TTL applied when `set` is called without one: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

// == Fetch Mode ==
/// How `SharedCache::get_or_set` treats concurrent misses on the same key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchMode {
    /// Every caller that observes a miss runs its own fetcher; last write wins.
    #[default]
    Independent,
    /// Concurrent callers for one key wait for the first fetch and reuse its result.
    SingleFlight,
}

// == Cache Config ==
/// Options recognized by `MemoryCache::new`.
///
/// ```
/// use airdrop_cache::cache::CacheConfig;
/// use std::time::Duration;
///
/// let config = CacheConfig::new()
///     .default_ttl(Duration::from_secs(60))
///     .max_items(500)
///     .enable_lru(false);
/// assert_eq!(config.max_items, Some(500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL used by `set` when none is given
    pub default_ttl: Duration,
    /// Item-count ceiling, `None` for unlimited
    pub max_items: Option<usize>,
    /// Aggregate size ceiling in bytes, `None` for unlimited
    pub max_size: Option<usize>,
    /// Evict least-recently-used when true, oldest-inserted when false
    pub enable_lru: bool,
    /// Count hits, misses, evictions and expirations
    pub enable_stats: bool,
    /// Concurrent `get_or_set` behavior
    pub fetch_mode: FetchMode,
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn enable_lru(mut self, enabled: bool) -> Self {
        self.enable_lru = enabled;
        self
    }

    pub fn enable_stats(mut self, enabled: bool) -> Self {
        self.enable_stats = enabled;
        self
    }

    pub fn fetch_mode(mut self, mode: FetchMode) -> Self {
        self.fetch_mode = mode;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            max_items: None,
            max_size: None,
            enable_lru: true,
            enable_stats: true,
            fetch_mode: FetchMode::Independent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert_eq!(config.max_items, None);
        assert_eq!(config.max_size, None);
        assert!(config.enable_lru);
        assert!(config.enable_stats);
        assert_eq!(config.fetch_mode, FetchMode::Independent);
    }

    #[test]
    fn test_config_builder() {
        let config = CacheConfig::new()
            .default_ttl(Duration::from_millis(100))
            .max_items(5)
            .max_size(1024)
            .enable_lru(false)
            .enable_stats(false)
            .fetch_mode(FetchMode::SingleFlight);

        assert_eq!(config.default_ttl, Duration::from_millis(100));
        assert_eq!(config.max_items, Some(5));
        assert_eq!(config.max_size, Some(1024));
        assert!(!config.enable_lru);
        assert!(!config.enable_stats);
        assert_eq!(config.fetch_mode, FetchMode::SingleFlight);
    }
}
