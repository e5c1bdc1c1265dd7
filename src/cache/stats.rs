//! Cache Statistics Module
//!
//! Tracks hit/miss/eviction counters and produces point-in-time snapshots.

use serde::Serialize;

// == Cache Stats ==
/// Running counters. Reset by `clear`.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries removed to satisfy a capacity ceiling
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed
    pub expirations: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Hit rate as a percentage, or 0.0 if no reads have been recorded.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    // == Snapshot ==
    /// Combines the counters with the store's current occupancy.
    pub fn snapshot(&self, total_entries: usize, total_size: usize) -> StatsSnapshot {
        let avg_size = if total_entries == 0 {
            0.0
        } else {
            total_size as f64 / total_entries as f64
        };

        StatsSnapshot {
            hits: self.hits,
            misses: self.misses,
            hit_rate: self.hit_rate(),
            evictions: self.evictions,
            expirations: self.expirations,
            total_entries,
            total_size,
            avg_size,
        }
    }
}

// == Stats Snapshot ==
/// Point-in-time view returned by `MemoryCache::stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses) * 100`, 0 with no reads
    pub hit_rate: f64,
    pub evictions: u64,
    pub expirations: u64,
    /// Live entries
    pub total_entries: usize,
    /// Sum of estimated entry sizes in bytes
    pub total_size: usize,
    /// `total_size / total_entries`, 0 when empty
    pub avg_size: f64,
}
