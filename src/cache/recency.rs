//! Recency Index Module
//!
//! Orders keys for eviction. Each key carries a logical tick; the smallest tick
//! is the next eviction candidate.

use std::collections::BTreeMap;

// == Recency Index ==
/// Tracks eviction order by logical tick.
///
/// Whether a tick is refreshed on reads (LRU) or only on writes (FIFO)
/// is decided by the store; the index just orders whatever it is given.
#[derive(Debug, Default)]
pub struct RecencyIndex {
    /// Tick -> key, oldest first
    order: BTreeMap<u64, String>,
    /// Next tick to hand out
    clock: u64,
}

impl RecencyIndex {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self {
            order: BTreeMap::new(),
            clock: 0,
        }
    }

    // == Next Tick ==
    /// Returns a tick strictly greater than every tick handed out before.
    pub fn next_tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    // == Insert ==
    /// Registers `key` at `tick`.
    pub fn insert(&mut self, key: &str, tick: u64) {
        self.order.insert(tick, key.to_string());
    }

    // == Promote ==
    /// Moves a key from `old_tick` to `new_tick`.
    pub fn promote(&mut self, old_tick: u64, new_tick: u64) {
        if let Some(key) = self.order.remove(&old_tick) {
            self.order.insert(new_tick, key);
        }
    }

    // == Remove ==
    /// Forgets the key registered at `tick`.
    pub fn remove(&mut self, tick: u64) {
        self.order.remove(&tick);
    }

    // == Pop Oldest ==
    /// Returns and removes the key with the smallest tick.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_first().map(|(_, key)| key)
    }

    /// Drops all keys. The clock keeps running so ticks stay unique.
    pub fn clear(&mut self) {
        self.order.clear();
    }
}
