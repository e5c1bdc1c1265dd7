//! Shared Cache Handle
//!
//! Cloneable, task-safe wrapper around `MemoryCache` plus the memoized-fetch
//! operation `get_or_set`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use regex::Regex;
use tokio::sync::{Mutex as AsyncMutex, RwLock, RwLockWriteGuard};
use tracing::debug;

use crate::cache::{
    CacheConfig, FetchMode, JsonSizeEstimator, MemoryCache, SizeEstimator, StatsSnapshot,
};

type FlightGates = Mutex<HashMap<String, Arc<AsyncMutex<()>>>>;

// == Shared Cache ==
/// Handle to a single `MemoryCache` shared by reference.
///
/// Clones point at the same store. Construct one per logical scope (for
/// example once at process start) and pass it to whoever needs it.
pub struct SharedCache<V, S = JsonSizeEstimator> {
    inner: Arc<RwLock<MemoryCache<V, S>>>,
    /// Per-key gates used in single-flight mode
    flights: Arc<FlightGates>,
    fetch_mode: FetchMode,
}

impl<V, S> Clone for SharedCache<V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            flights: Arc::clone(&self.flights),
            fetch_mode: self.fetch_mode,
        }
    }
}

impl<V> SharedCache<V, JsonSizeEstimator> {
    pub fn new(config: CacheConfig) -> Self {
        Self::from_store(MemoryCache::new(config))
    }
}

impl<V, S> SharedCache<V, S> {
    /// Wraps an existing store.
    pub fn from_store(store: MemoryCache<V, S>) -> Self {
        let fetch_mode = store.config().fetch_mode;
        Self {
            inner: Arc::new(RwLock::new(store)),
            flights: Arc::new(Mutex::new(HashMap::new())),
            fetch_mode,
        }
    }
}

impl<V, S> SharedCache<V, S>
where
    V: Clone,
    S: SizeEstimator<V>,
{
    /// Exclusive access to the underlying store for multi-step operations.
    pub async fn lock(&self) -> RwLockWriteGuard<'_, MemoryCache<V, S>> {
        self.inner.write().await
    }

    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        self.inner.write().await.set(key, value, ttl);
    }

    // Reads take the write lock: hits bump recency and counters.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.write().await.get(key).cloned()
    }

    pub async fn has(&self, key: &str) -> bool {
        self.inner.write().await.has(key)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.inner.write().await.delete(key)
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    pub async fn size(&self) -> usize {
        self.inner.write().await.size()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.inner.write().await.keys()
    }

    pub async fn ttl(&self, key: &str) -> i64 {
        self.inner.write().await.ttl(key)
    }

    pub async fn extend(&self, key: &str, additional: Duration) -> bool {
        self.inner.write().await.extend(key, additional)
    }

    pub async fn stats(&self) -> StatsSnapshot {
        self.inner.write().await.stats()
    }

    pub async fn get_many<I, K>(&self, keys: I) -> HashMap<String, V>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.inner.write().await.get_many(keys)
    }

    pub async fn set_many<I, K>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V, Option<Duration>)>,
        K: Into<String>,
    {
        self.inner.write().await.set_many(entries);
    }

    pub async fn delete_many<I, K>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.inner.write().await.delete_many(keys)
    }

    pub async fn get_pattern(&self, pattern: &Regex) -> HashMap<String, V> {
        self.inner.write().await.get_pattern(pattern)
    }

    pub async fn delete_pattern(&self, pattern: &Regex) -> usize {
        self.inner.write().await.delete_pattern(pattern)
    }

    pub async fn prune(&self) -> usize {
        self.inner.write().await.prune()
    }

    // == Get Or Set ==
    /// Returns the cached value for `key`, or runs `fetcher` and caches its result.
    ///
    /// A fetch error is returned unchanged and nothing is cached. The store lock
    /// is not held while `fetcher` runs.
    ///
    /// With [`FetchMode::SingleFlight`], concurrent callers missing on the same
    /// key queue behind the first fetch and return its cached result. A failed
    /// fetch is not shared; the next caller in line fetches again.
    pub async fn get_or_set<F, Fut, E>(
        &self,
        key: &str,
        fetcher: F,
        ttl: Option<Duration>,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        match self.fetch_mode {
            FetchMode::Independent => self.fetch_and_store(key, fetcher, ttl).await,
            FetchMode::SingleFlight => {
                let permit = self.flight_permit(key);
                let _turn = permit.gate.lock().await;

                let cached = self.inner.write().await.peek(key).cloned();
                match cached {
                    Some(value) => Ok(value),
                    None => self.fetch_and_store(key, fetcher, ttl).await,
                }
            }
        }
    }

    async fn fetch_and_store<F, Fut, E>(
        &self,
        key: &str,
        fetcher: F,
        ttl: Option<Duration>,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        debug!(key, "Cache miss, fetching");
        let value = fetcher().await?;
        self.inner.write().await.set(key, value.clone(), ttl);
        Ok(value)
    }

    fn flight_permit<'a>(&'a self, key: &'a str) -> FlightPermit<'a> {
        let mut gates = self.flights.lock().unwrap_or_else(PoisonError::into_inner);
        let gate = gates
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        FlightPermit {
            gates: &self.flights,
            key,
            gate,
        }
    }
}

// == Flight Permit ==
/// Holds a reference to a key's gate; drops the gate from the map when the
/// last holder goes away, including when the caller's future is cancelled.
struct FlightPermit<'a> {
    gates: &'a FlightGates,
    key: &'a str,
    gate: Arc<AsyncMutex<()>>,
}

impl Drop for FlightPermit<'_> {
    fn drop(&mut self) {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one here: nobody else is waiting.
        if Arc::strong_count(&self.gate) == 2 {
            gates.remove(self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    fn counting_fetch(
        calls: Arc<AtomicUsize>,
        value: &'static str,
    ) -> impl Future<Output = Result<String, String>> {
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(value.to_string())
        }
    }

    #[tokio::test]
    async fn test_shared_clones_see_same_store() {
        let cache: SharedCache<String> = SharedCache::new(CacheConfig::default());
        let other = cache.clone();

        cache.set("key1", "value1".to_string(), None).await;

        assert_eq!(other.get("key1").await, Some("value1".to_string()));
        assert!(other.delete("key1").await);
        assert!(!cache.has("key1").await);
    }

    #[tokio::test]
    async fn test_get_or_set_fetches_once_then_hits() {
        let cache: SharedCache<String> = SharedCache::new(CacheConfig::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache
            .get_or_set("wallet", || counting_fetch(calls.clone(), "first"), None)
            .await;
        assert_eq!(assert_ok!(first), "first");

        let second = cache
            .get_or_set("wallet", || counting_fetch(calls.clone(), "second"), None)
            .await;
        assert_eq!(assert_ok!(second), "first");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[tokio::test]
    async fn test_get_or_set_error_is_not_cached() {
        let cache: SharedCache<String> = SharedCache::new(CacheConfig::default());

        let result = cache
            .get_or_set("wallet", || async { Err::<String, _>("upstream timeout") }, None)
            .await;

        assert_eq!(assert_err!(result), "upstream timeout");
        assert!(!cache.has("wallet").await);
    }

    #[tokio::test]
    async fn test_get_or_set_honors_ttl() {
        let cache: SharedCache<String> = SharedCache::new(CacheConfig::default());

        let value = cache
            .get_or_set(
                "short",
                || async { Ok::<_, String>("v".to_string()) },
                Some(Duration::from_millis(30)),
            )
            .await;
        assert_ok!(value);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.ttl("short").await, -1);
    }

    #[tokio::test]
    async fn test_independent_mode_fetches_per_caller() {
        let cache: SharedCache<String> = SharedCache::new(CacheConfig::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let cache = cache.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_set("hot", || counting_fetch(calls, "v"), None)
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert_ok!(handle.await.unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(cache.size().await, 1);
    }

    #[tokio::test]
    async fn test_single_flight_mode_fetches_once() {
        let cache: SharedCache<String> =
            SharedCache::new(CacheConfig::new().fetch_mode(FetchMode::SingleFlight));
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let cache = cache.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_set("hot", || counting_fetch(calls, "v"), None)
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(assert_ok!(handle.await.unwrap()), "v");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.flights.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_flight_retries_after_failure() {
        let cache: SharedCache<String> =
            SharedCache::new(CacheConfig::new().fetch_mode(FetchMode::SingleFlight));

        let failed = cache
            .get_or_set("k", || async { Err::<String, _>("boom") }, None)
            .await;
        assert_err!(failed);

        let ok = cache
            .get_or_set("k", || async { Ok::<_, &str>("v".to_string()) }, None)
            .await;
        assert_eq!(assert_ok!(ok), "v");
    }

    #[tokio::test]
    async fn test_single_flight_waiter_refetches_after_failure() {
        let cache: SharedCache<String> =
            SharedCache::new(CacheConfig::new().fetch_mode(FetchMode::SingleFlight));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..3 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_set(
                        "claim",
                        || async move {
                            let n = calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            if n == 0 {
                                Err(format!("fail{}", n))
                            } else {
                                Ok(format!("ok{}", n))
                            }
                        },
                        None,
                    )
                    .await
            }));
            // Later callers queue on the gate while the first fetch is running
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(assert_err!(results[0].clone()), "fail0");
        assert_eq!(assert_ok!(results[1].clone()), "ok1");
        assert_eq!(assert_ok!(results[2].clone()), "ok1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.flights.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shared_batch_and_pattern() {
        let cache: SharedCache<u64> = SharedCache::new(CacheConfig::default());

        cache
            .set_many(vec![("balance:1", 10, None), ("balance:2", 20, None), ("nonce:1", 3, None)])
            .await;

        let pattern = Regex::new(r"^balance:").unwrap();
        assert_eq!(cache.get_pattern(&pattern).await.len(), 2);
        assert_eq!(cache.get_many(["nonce:1", "nope"]).await.len(), 1);
        assert_eq!(cache.delete_pattern(&pattern).await, 2);
        assert_eq!(cache.delete_many(["nonce:1"]).await, 1);
        assert_eq!(cache.size().await, 0);
    }
}
