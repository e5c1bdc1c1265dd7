//! Prune Task
//!
//! The cache only expires entries lazily on read. This task sweeps the
//! remaining expired entries on a fixed interval.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{SharedCache, SizeEstimator};

/// Spawns a background task that periodically prunes expired cache entries.
///
/// The task loops forever, sleeping for `interval` between runs. Abort the
/// returned handle to stop it during shutdown.
///
/// # Example
/// ```ignore
/// let cache: SharedCache<serde_json::Value> = SharedCache::new(CacheConfig::default());
/// let prune_handle = spawn_prune_task(cache.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// prune_handle.abort();
/// ```
pub fn spawn_prune_task<V, S>(cache: SharedCache<V, S>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
    S: SizeEstimator<V> + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!("Starting prune task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.prune().await;

            if removed > 0 {
                info!("Prune: removed {} expired entries", removed);
            } else {
                debug!("Prune: no expired entries found");
            }
        }
    })
}
