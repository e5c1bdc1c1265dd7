//! Cache Entry Module
//!
//! Defines the record stored per key: the value plus expiry, recency and size metadata.

use std::time::Duration;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Last successful read (Unix milliseconds), equal to `created_at` until read
    pub last_accessed_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Approximate serialized size of `value` in bytes
    pub size: usize,
    /// Position in eviction order; larger is newer
    pub(crate) tick: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    ///
    /// A zero `ttl` produces an entry that is already expired.
    pub fn new(value: V, ttl: Duration, size: usize, tick: u64) -> Self {
        let now = current_timestamp_ms();

        Self {
            value,
            created_at: now,
            last_accessed_at: now,
            expires_at: now.saturating_add(duration_ms(ttl)),
            size,
            tick,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is greater
    /// than or equal to the expiration time, so a TTL of zero is never readable.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Same as [`is_expired`](Self::is_expired) against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }

    // == Extend ==
    /// Pushes the expiry back by `additional`, relative to the current expiry.
    pub fn extend(&mut self, additional: Duration) {
        self.expires_at = self.expires_at.saturating_add(duration_ms(additional));
    }

    // == Touch ==
    /// Records a read at the current time.
    pub(crate) fn touch(&mut self, tick: u64) {
        self.last_accessed_at = current_timestamp_ms();
        self.tick = tick;
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
