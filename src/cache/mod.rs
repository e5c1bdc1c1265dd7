//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, LRU/FIFO eviction and
//! count and byte-size ceilings.

mod config;
mod entry;
mod recency;
mod shared;
mod size;
mod stats;
mod store;


// Re-export public types
pub use config::{CacheConfig, FetchMode, DEFAULT_TTL};
pub use entry::CacheEntry;
pub use recency::RecencyIndex;
pub use shared::SharedCache;
pub use size::{JsonSizeEstimator, SizeEstimator};
pub use stats::{CacheStats, StatsSnapshot};
pub use store::MemoryCache;
