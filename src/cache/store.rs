//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with recency ordering, TTL
//! expiration and count/size ceilings.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, trace};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{
    CacheConfig, CacheEntry, CacheStats, JsonSizeEstimator, RecencyIndex, SizeEstimator,
    StatsSnapshot,
};

// == Memory Cache ==
/// In-process key-value store with per-entry TTL and LRU or FIFO eviction.
///
/// Expired entries are never returned. They are dropped lazily when a read
/// touches them, or all at once by [`prune`](Self::prune).
///
/// Every method that may expire an entry, bump recency or count a hit takes
/// `&mut self`. Wrap the store in [`SharedCache`](crate::cache::SharedCache)
/// to share it between tasks.
pub struct MemoryCache<V, S = JsonSizeEstimator> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Eviction order
    recency: RecencyIndex,
    /// Performance statistics
    stats: CacheStats,
    /// Sum of `size` over stored entries
    total_size: usize,
    config: CacheConfig,
    estimator: S,
}

impl<V> MemoryCache<V, JsonSizeEstimator> {
    // == Constructor ==
    /// Creates a cache that sizes values by their JSON encoding.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_estimator(config, JsonSizeEstimator)
    }
}

impl<V, S> MemoryCache<V, S> {
    /// Creates a cache with a custom size estimator.
    pub fn with_estimator(config: CacheConfig, estimator: S) -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyIndex::new(),
            stats: CacheStats::new(),
            total_size: 0,
            config,
            estimator,
        }
    }

    /// Number of stored entries, including expired ones not yet pruned.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of estimated entry sizes in bytes.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

impl<V, S> MemoryCache<V, S>
where
    S: SizeEstimator<V>,
{
    // == Set ==
    /// Stores a value, replacing any existing entry for `key`.
    ///
    /// `ttl` defaults to the configured default TTL. A zero TTL stores an
    /// entry that is already expired. After insertion, entries are evicted in
    /// policy order until both ceilings hold; the new entry itself is evicted
    /// if it alone exceeds them.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let size = self.estimator.estimate(&value);
        let tick = self.recency.next_tick();
        let entry = CacheEntry::new(value, ttl.unwrap_or(self.config.default_ttl), size, tick);

        if let Some(old) = self.entries.insert(key.clone(), entry) {
            self.recency.remove(old.tick);
            self.total_size -= old.size;
        }
        self.recency.insert(&key, tick);
        self.total_size += size;

        self.enforce_capacity();
    }

    // == Get ==
    /// Returns the live value for `key`.
    ///
    /// Counts a hit or a miss. In LRU mode a hit makes the entry the most
    /// recently used. An expired entry is removed and reported as a miss.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        if !self.retain_if_live(key) {
            if self.config.enable_stats {
                self.stats.record_miss();
            }
            return None;
        }

        if self.config.enable_stats {
            self.stats.record_hit();
        }

        let tick = self.config.enable_lru.then(|| self.recency.next_tick());
        let entry = self.entries.get_mut(key)?;
        if let Some(tick) = tick {
            self.recency.promote(entry.tick, tick);
            entry.touch(tick);
        }
        Some(&entry.value)
    }

    // == Peek ==
    /// Returns the live value without counting statistics or touching recency.
    pub fn peek(&mut self, key: &str) -> Option<&V> {
        if self.retain_if_live(key) {
            self.entries.get(key).map(|entry| &entry.value)
        } else {
            None
        }
    }

    // == Has ==
    /// Existence check. Does not count toward statistics or eviction order.
    pub fn has(&mut self, key: &str) -> bool {
        self.retain_if_live(key)
    }

    // == Delete ==
    /// Removes an entry. Returns whether one was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key).is_some()
    }

    // == Clear ==
    /// Drops every entry and resets all statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
        self.total_size = 0;
        self.stats = CacheStats::new();
    }

    // == Size ==
    /// Number of live entries. Prunes expired entries first.
    pub fn size(&mut self) -> usize {
        self.prune();
        self.entries.len()
    }

    // == Keys ==
    /// All live keys, in no particular order.
    pub fn keys(&mut self) -> Vec<String> {
        self.prune();
        self.entries.keys().cloned().collect()
    }

    // == TTL ==
    /// Milliseconds until `key` expires, or -1 if it is absent or expired.
    pub fn ttl(&mut self, key: &str) -> i64 {
        if !self.retain_if_live(key) {
            return -1;
        }
        self.entries
            .get(key)
            .map(CacheEntry::ttl_remaining_ms)
            .filter(|ms| *ms > 0)
            .map_or(-1, |ms| i64::try_from(ms).unwrap_or(i64::MAX))
    }

    // == Extend ==
    /// Adds `additional` to a live entry's expiry. Returns false, without
    /// creating anything, if the key is absent or expired.
    pub fn extend(&mut self, key: &str, additional: Duration) -> bool {
        if !self.retain_if_live(key) {
            return false;
        }
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.extend(additional);
                true
            }
            None => false,
        }
    }

    // == Stats ==
    /// Returns current statistics. Prunes first so sizes cover live entries only.
    pub fn stats(&mut self) -> StatsSnapshot {
        self.prune();
        self.stats.snapshot(self.entries.len(), self.total_size)
    }

    // == Batch Operations ==
    /// Looks up several keys. Absent and expired keys are omitted from the result.
    pub fn get_many<I, K>(&mut self, keys: I) -> HashMap<String, V>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
        V: Clone,
    {
        let mut found = HashMap::new();
        for key in keys {
            let key = key.as_ref();
            if let Some(value) = self.get(key) {
                let value = value.clone();
                found.insert(key.to_string(), value);
            }
        }
        found
    }

    /// Stores several `(key, value, ttl)` triples in order.
    pub fn set_many<I, K>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V, Option<Duration>)>,
        K: Into<String>,
    {
        for (key, value, ttl) in entries {
            self.set(key, value, ttl);
        }
    }

    /// Removes several keys. Returns how many were actually present.
    pub fn delete_many<I, K>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter()
            .filter(|key| self.delete(key.as_ref()))
            .count()
    }

    // == Pattern Operations ==
    /// Reads every live entry whose key matches `pattern`, as `get` would.
    pub fn get_pattern(&mut self, pattern: &Regex) -> HashMap<String, V>
    where
        V: Clone,
    {
        let matched = self.matching_keys(pattern);
        self.get_many(matched)
    }

    /// Removes every live entry whose key matches `pattern`. Returns the count.
    pub fn delete_pattern(&mut self, pattern: &Regex) -> usize {
        let matched = self.matching_keys(pattern);
        self.delete_many(matched)
    }

    // == Prune ==
    /// Removes all expired entries. Returns the number removed.
    pub fn prune(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }

        if self.config.enable_stats {
            self.stats.record_expirations(expired.len());
        }
        if !expired.is_empty() {
            trace!(count = expired.len(), "Pruned expired cache entries");
        }
        expired.len()
    }

    // == Internal Helpers ==
    /// Returns true if `key` holds a live entry; removes it if it has expired.
    fn retain_if_live(&mut self, key: &str) -> bool {
        let expired = match self.entries.get(key) {
            None => return false,
            Some(entry) => entry.is_expired(),
        };
        if expired {
            self.expire(key);
        }
        !expired
    }

    fn expire(&mut self, key: &str) {
        if self.remove_entry(key).is_some() {
            trace!(key, "Dropped expired cache entry");
            if self.config.enable_stats {
                self.stats.record_expirations(1);
            }
        }
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.recency.remove(entry.tick);
        self.total_size -= entry.size;
        Some(entry)
    }

    fn matching_keys(&mut self, pattern: &Regex) -> Vec<String> {
        self.prune();
        self.entries
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect()
    }

    fn over_capacity(&self) -> bool {
        let over_items = self
            .config
            .max_items
            .is_some_and(|max| self.entries.len() > max);
        let over_size = self
            .config
            .max_size
            .is_some_and(|max| self.total_size > max);
        over_items || over_size
    }

    fn enforce_capacity(&mut self) {
        while self.over_capacity() {
            let Some(key) = self.recency.pop_oldest() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&key) {
                self.total_size -= entry.size;
                if self.config.enable_stats {
                    self.stats.record_eviction();
                }
                debug!(key = %key, size = entry.size, "Evicted cache entry");
            }
        }
    }
}

impl<V, S> fmt::Debug for MemoryCache<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.entries.len())
            .field("total_size", &self.total_size)
            .field("config", &self.config)
            .finish()
    }
}
