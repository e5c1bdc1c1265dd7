//! Airdrop Cache - in-memory TTL cache for the Airdrop Finder API
//!
//! Key-value store with per-entry expiry, LRU or FIFO eviction under item and
//! byte-size ceilings, batch and pattern operations, and memoized fetches.
//! A small HTTP service exposes a shared instance.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheConfig, FetchMode, MemoryCache, SharedCache};
pub use config::Config;
pub use tasks::spawn_prune_task;
