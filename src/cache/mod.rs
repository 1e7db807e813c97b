//! Cache-aside helper with a fixed time-to-live.
//!
//! Values are stored already serialized so a hit returns exactly the bytes
//! produced by the miss that filled it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

struct CacheEntry {
    payload: String,
    expires_at: Instant,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    /// Bumped by invalidations that race an in-flight fill. A miss only stores
    /// its result if the generation it started with is still current.
    /// Emptied whenever no fill is running.
    generations: HashMap<String, u64>,
}

pub struct TtlCache {
    ttl: Duration,
    inner: RwLock<CacheInner>,
    fills_in_flight: AtomicUsize,
}

/// Counts one running fill; released even if the caller's future is dropped.
struct FillGuard<'a>(&'a AtomicUsize);

impl<'a> FillGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for FillGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(CacheInner::default()),
            fills_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the live entry for `key`, if any.
    pub async fn get(&self, key: &str) -> Option<String> {
        let inner = self.inner.read().await;
        inner
            .entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.payload.clone())
    }

    /// Serve `key` from cache, or run `compute` and remember its result.
    ///
    /// Errors from `compute` are returned as-is and never cached. No lock is
    /// held while `compute` runs, so concurrent misses may each compute.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &str, compute: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        // Registered before the generation is read so a racing invalidation sees it.
        let _fill = FillGuard::enter(&self.fills_in_flight);
        let generation = {
            let inner = self.inner.read().await;
            if let Some(entry) = inner.entries.get(key) {
                if entry.expires_at > Instant::now() {
                    tracing::debug!(key, "cache hit");
                    return Ok(entry.payload.clone());
                }
            }
            inner.generations.get(key).copied().unwrap_or(0)
        };

        tracing::debug!(key, "cache miss");
        let payload = compute().await?;

        let mut inner = self.inner.write().await;
        let now = Instant::now();
        // Expired entries are never served; drop them while we hold the write lock.
        inner.entries.retain(|_, entry| entry.expires_at > now);

        let current = inner.generations.get(key).copied().unwrap_or(0);
        if current == generation {
            inner.entries.insert(
                key.to_string(),
                CacheEntry {
                    payload: payload.clone(),
                    expires_at: now + self.ttl,
                },
            );
        } else {
            // An invalidation landed while we were computing; our result may predate that write.
            tracing::debug!(key, "skipping cache fill after concurrent invalidation");
        }
        Ok(payload)
    }

    /// Drop `key` so the next read recomputes.
    pub async fn invalidate(&self, key: &str) {
        let mut inner = self.inner.write().await;
        inner.entries.remove(key);
        if self.fills_in_flight.load(Ordering::SeqCst) == 0 {
            // No fill can hold a generation it read earlier.
            inner.generations.clear();
        } else {
            *inner.generations.entry(key.to_string()).or_insert(0) += 1;
        }
        tracing::debug!(key, "cache invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::Arc;

    fn counting(counter: &Arc<AtomicUsize>, value: &str) -> impl Future<Output = Result<String, Infallible>> {
        let counter = counter.clone();
        let value = value.to_string();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(value)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hit_within_ttl_skips_compute() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.get_or_try_insert_with("k", || counting(&calls, "v1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(59)).await;
        let second = cache.get_or_try_insert_with("k", || counting(&calls, "v2")).await.unwrap();

        assert_eq!(first, "v1");
        assert_eq!(second, "v1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_try_insert_with("k", || counting(&calls, "v1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cache.get("k").await.is_none());

        let refreshed = cache.get_or_try_insert_with("k", || counting(&calls, "v2")).await.unwrap();
        assert_eq!(refreshed, "v2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_recompute() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_try_insert_with("a", || counting(&calls, "a1")).await.unwrap();
        cache.get_or_try_insert_with("b", || counting(&calls, "b1")).await.unwrap();
        cache.invalidate("a").await;

        assert!(cache.get("a").await.is_none());
        assert_eq!(cache.get("b").await.as_deref(), Some("b1"));
        let a = cache.get_or_try_insert_with("a", || counting(&calls, "a2")).await.unwrap();
        assert_eq!(a, "a2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = TtlCache::new(Duration::from_secs(60));

        let err = cache
            .get_or_try_insert_with("k", || async { Err::<String, _>("boom") })
            .await
            .unwrap_err();
        assert_eq!(err, "boom");
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn invalidation_during_compute_discards_the_fill() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let handle = &cache;

        let value = cache
            .get_or_try_insert_with("k", || async move {
                handle.invalidate("k").await;
                Ok::<_, Infallible>("stale".to_string())
            })
            .await
            .unwrap();

        assert_eq!(value, "stale");
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn generations_do_not_outlive_fills() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let handle = &cache;

        for subject in ["a", "b", "c"] {
            cache
                .get_or_try_insert_with(subject, || async move {
                    handle.invalidate(subject).await;
                    Ok::<_, Infallible>(subject.to_string())
                })
                .await
                .unwrap();
        }
        assert_eq!(cache.inner.read().await.generations.len(), 3);

        cache.invalidate("d").await;
        assert!(cache.inner.read().await.generations.is_empty());
        assert_eq!(cache.fills_in_flight.load(Ordering::SeqCst), 0);
    }
}
