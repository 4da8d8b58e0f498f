//! Time-bounded memoization in front of fetches and folder probes.
//!
//! A [`ContentCache`] maps a fully qualified resource locator (URL, file path,
//! or folder key) to the last successfully produced value. Each cache has its
//! own TTL; the resolver keeps one cache for raw fetches
//! ([`DEFAULT_FETCH_TTL`]) and one for folder-probe results
//! ([`DEFAULT_PROBE_TTL`]).
//!
//! Failures are never stored, so a transient error is retried on the next
//! call. Entries are replaced wholesale and only removed by
//! [`ContentCache::invalidate_all`].
//!
//! ## Example
//!
//! ```rust
//! use diagram_catalog::cache::ContentCache;
//! use std::time::Duration;
//!
//! let cache: ContentCache<String> = ContentCache::new(Duration::from_secs(60));
//! cache.set("https://example.org/a.json", "{}".to_string());
//! assert_eq!(cache.get("https://example.org/a.json").as_deref(), Some("{}"));
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// TTL for raw fetches
pub const DEFAULT_FETCH_TTL: Duration = Duration::from_secs(60);

/// TTL for derived folder-probe results
pub const DEFAULT_PROBE_TTL: Duration = Duration::from_secs(5 * 60);

/// A cached value and the instant it was stored
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub stored_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// TTL cache keyed by resource locator
#[derive(Debug)]
pub struct ContentCache<T> {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> ContentCache<T> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value if it is younger than the TTL
    pub fn get(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl, Instant::now()))
            .map(|entry| entry.value.clone())
    }

    /// Store a value, replacing any previous entry for the key
    pub fn set(&self, key: impl Into<String>, value: T) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), entry);
    }

    /// Drop every entry
    pub fn invalidate_all(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of stored entries, including expired ones not yet replaced
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached value, or run `produce` and cache its `Ok` result.
    ///
    /// Errors are returned as-is and leave the cache untouched. The lock is
    /// not held while `produce` runs, so concurrent misses on the same key
    /// each do the work and the last one to finish wins.
    ///
    /// # Errors
    ///
    /// Returns whatever error `produce` returns.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &str, produce: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(key) {
            debug!(key, "cache hit");
            return Ok(value);
        }

        debug!(key, "cache miss");
        let value = produce().await?;
        self.set(key, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let cache = ContentCache::new(Duration::from_secs(60));
        cache.set("a", 1);

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("a"), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_at_ttl_boundary() {
        let cache = ContentCache::new(Duration::from_secs(60));
        cache.set("a", 1);

        // Age must be strictly less than the TTL
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(cache.get("a"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_replaces_and_refreshes() {
        let cache = ContentCache::new(Duration::from_secs(10));
        cache.set("a", 1);
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set("a", 2);
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(cache.get("a"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_all() {
        let cache = ContentCache::new(DEFAULT_FETCH_TTL);
        cache.set("a", "x".to_string());
        cache.set("b", "y".to_string());
        assert_eq!(cache.len(), 2);

        cache.invalidate_all();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_or_try_insert_runs_once_within_ttl() {
        let cache = ContentCache::new(DEFAULT_FETCH_TTL);
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Result<u32, ()> = cache
                .get_or_try_insert_with("k", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
            assert_eq!(value, Ok(7));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(DEFAULT_FETCH_TTL).await;
        let _: Result<u32, ()> = cache
            .get_or_try_insert_with("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: ContentCache<u32> = ContentCache::new(DEFAULT_FETCH_TTL);

        let first: Result<u32, &str> = cache
            .get_or_try_insert_with("k", || async { Err("offline") })
            .await;
        assert_eq!(first, Err("offline"));
        assert!(cache.is_empty());

        let second: Result<u32, &str> = cache.get_or_try_insert_with("k", || async { Ok(3) }).await;
        assert_eq!(second, Ok(3));
    }
}
