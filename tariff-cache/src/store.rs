//! Fetch-or-compute cache store.
//!
//! This module implements the core caching logic: reads answered from
//! unexpired entries, recomputes guarded per key, and expired entries
//! briefly re-armed so concurrent callers read the stale value instead of
//! stampeding the compute.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use tariff_core::TariffResult;

use crate::backend::{CacheBackend, CacheStats};
use crate::entry::CacheEntry;

/// Per-fetch options for [`RateCache::fetch_or_compute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// How long a computed value stays fresh.
    pub ttl: Duration,
    /// Grace period after expiry during which one caller recomputes while
    /// the rest read the stale value. Zero disables stale serving, so
    /// concurrent callers wait for the fresh value instead.
    pub stale_window: Duration,
    /// Whether an absent computed value is written to the store. When
    /// false, absent results are returned but never cached and the next
    /// fetch recomputes.
    pub store_absent: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300), // 5 minutes
            stale_window: Duration::from_secs(10),
            store_absent: false,
        }
    }
}

impl FetchOptions {
    /// Create fetch options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the stale-serving window.
    pub fn with_stale_window(mut self, window: Duration) -> Self {
        self.stale_window = window;
        self
    }

    /// Cache absent results instead of recomputing them each fetch.
    pub fn with_store_absent(mut self, store: bool) -> Self {
        self.store_absent = store;
        self
    }
}

/// Counters shared across clones of the store.
#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    stale_refreshes: AtomicU64,
}

/// Fetch-or-compute cache over a pluggable backend.
///
/// The store owns the expiry policy. Backends hold entries; this type
/// decides when an entry answers a fetch, when it is re-armed for stale
/// serving, and when the compute function runs.
///
/// # Stampede protection
///
/// Recomputes are guarded per key. On a cold miss, concurrent callers for
/// the same key serialize behind the first one and reuse its stored result.
/// On expiry within the stale window, the expired entry is re-armed before
/// the compute starts, so concurrent callers read the previous value
/// without blocking.
///
/// Cloning is cheap and all clones share the backend, the guards, and the
/// counters.
pub struct RateCache<B>
where
    B: CacheBackend,
{
    /// The cache backend.
    backend: Arc<B>,
    /// One guard per key with a recompute in flight.
    in_flight: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    /// Fetch counters.
    counters: Arc<Counters>,
}

impl<B> RateCache<B>
where
    B: CacheBackend,
{
    /// Create a new store over `backend`.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Get a reference to the cache backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetch the value for `key`, running `compute` on miss.
    ///
    /// An unexpired entry answers immediately without running `compute`;
    /// that includes an entry holding a cached absent result, which answers
    /// `Ok(None)`. Otherwise the caller takes the per-key guard, re-checks
    /// the backend (another caller may have finished meanwhile), and
    /// recomputes:
    ///
    /// - an entry that expired within `stale_window` is re-armed first, so
    ///   concurrent callers keep reading the stale value during the compute;
    /// - an entry expired beyond the window is removed;
    /// - the computed value is stored for `ttl`, except an absent result
    ///   when `store_absent` is off.
    ///
    /// `compute` only runs when this call decided to recompute. If the
    /// returned future is dropped mid-compute nothing is stored; a re-armed
    /// entry ages out on its own and the next fetch recomputes.
    ///
    /// # Errors
    ///
    /// Returns an error only when the backend fails. Compute outcomes,
    /// including absent ones, are values.
    pub async fn fetch_or_compute<F>(
        &self,
        key: &str,
        options: FetchOptions,
        compute: F,
    ) -> TariffResult<Option<String>>
    where
        F: Future<Output = Option<String>> + Send,
    {
        // Fast path: an unexpired entry, including one re-armed by a
        // concurrent recompute.
        if let Some(entry) = self.backend.read(key).await? {
            if !entry.is_expired_at(Utc::now()) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(entry.value().map(str::to_string));
            }
        }

        let guard = self.lock_key(key).await;
        let result = self.recompute(key, &options, compute).await;
        drop(guard);
        self.release_key(key).await;
        result
    }

    /// Drop the entry for `key`, forcing the next fetch to recompute.
    pub async fn invalidate(&self, key: &str) -> TariffResult<()> {
        self.backend.remove(key).await
    }

    /// Snapshot of the fetch counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            stale_refreshes: self.counters.stale_refreshes.load(Ordering::Relaxed),
        }
    }

    /// Acquire the per-key guard, creating its slot on first use.
    async fn lock_key(&self, key: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut in_flight = self.in_flight.lock().await;
            Arc::clone(
                in_flight
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        slot.lock_owned().await
    }

    /// Drop the guard slot for `key` once no caller holds or awaits it.
    async fn release_key(&self, key: &str) {
        let mut in_flight = self.in_flight.lock().await;
        if let Some(slot) = in_flight.get(key) {
            if Arc::strong_count(slot) == 1 {
                in_flight.remove(key);
            }
        }
    }

    /// Recompute the value for `key`. Caller holds the per-key guard.
    async fn recompute<F>(
        &self,
        key: &str,
        options: &FetchOptions,
        compute: F,
    ) -> TariffResult<Option<String>>
    where
        F: Future<Output = Option<String>> + Send,
    {
        let now = Utc::now();

        // Re-check under the guard: another caller may have stored a fresh
        // value, or re-armed the entry, while this one waited.
        if let Some(entry) = self.backend.read(key).await? {
            if !entry.is_expired_at(now) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(entry.value().map(str::to_string));
            }

            if entry.in_stale_window(now, options.stale_window) {
                // Keep the stale value readable while this caller recomputes.
                let mut rearmed = entry;
                rearmed.rearm(now, options.stale_window);
                self.backend.write(key, rearmed).await?;
                self.counters.stale_refreshes.fetch_add(1, Ordering::Relaxed);
            } else {
                self.backend.remove(key).await?;
            }
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute.await;

        if value.is_some() || options.store_absent {
            self.backend
                .write(key, CacheEntry::new(value.clone(), options.ttl))
                .await?;
        }

        Ok(value)
    }
}

impl<B> Clone for RateCache<B>
where
    B: CacheBackend,
{
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            in_flight: Arc::clone(&self.in_flight),
            counters: Arc::clone(&self.counters),
        }
    }
}

// ===== TESTS =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    #[test]
    fn test_fetch_options_builder() {
        let options = FetchOptions::new()
            .with_ttl(Duration::from_secs(600))
            .with_stale_window(Duration::from_secs(30))
            .with_store_absent(true);

        assert_eq!(options.ttl, Duration::from_secs(600));
        assert_eq!(options.stale_window, Duration::from_secs(30));
        assert!(options.store_absent);
    }

    #[test]
    fn test_fetch_options_defaults() {
        let options = FetchOptions::default();
        assert_eq!(options.ttl, Duration::from_secs(300));
        assert_eq!(options.stale_window, Duration::from_secs(10));
        assert!(!options.store_absent);
    }

    #[tokio::test]
    async fn test_miss_computes_and_stores() {
        let backend = Arc::new(MemoryBackend::new());
        let cache = RateCache::new(Arc::clone(&backend));
        let calls = Arc::new(AtomicUsize::new(0));

        let value = cache
            .fetch_or_compute("k", FetchOptions::new(), {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Some("15000".to_string())
                }
            })
            .await
            .unwrap();

        assert_eq!(value.as_deref(), Some("15000"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stored = backend.read("k").await.unwrap().unwrap();
        assert_eq!(stored.value(), Some("15000"));
        assert!(!stored.is_expired_at(Utc::now()));
    }

    #[tokio::test]
    async fn test_fresh_entry_answers_without_compute() {
        let cache = RateCache::new(Arc::new(MemoryBackend::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let value = cache
                .fetch_or_compute("k", FetchOptions::new(), {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Some("15000".to_string())
                    }
                })
                .await
                .unwrap();
            assert_eq!(value.as_deref(), Some("15000"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_absent_result_not_cached() {
        let backend = Arc::new(MemoryBackend::new());
        let cache = RateCache::new(Arc::clone(&backend));
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let value = cache
                .fetch_or_compute("k", FetchOptions::new(), {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        None
                    }
                })
                .await
                .unwrap();
            assert_eq!(value, None);
        }

        // Absent results are recomputed each fetch by default.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(backend.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_store_absent_caches_absent_result() {
        let backend = Arc::new(MemoryBackend::new());
        let cache = RateCache::new(Arc::clone(&backend));
        let options = FetchOptions::new().with_store_absent(true);
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let value = cache
                .fetch_or_compute("k", options.clone(), {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        None
                    }
                })
                .await
                .unwrap();
            assert_eq!(value, None);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.entry_count().await, 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_beyond_window_recomputes() {
        let backend = Arc::new(MemoryBackend::new());
        let cache = RateCache::new(Arc::clone(&backend));
        let now = Utc::now();

        backend
            .write(
                "k",
                CacheEntry::with_timestamps(
                    Some("old".to_string()),
                    now - chrono::Duration::hours(1),
                    now - chrono::Duration::minutes(30),
                ),
            )
            .await
            .unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let value = cache
            .fetch_or_compute("k", FetchOptions::new(), {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Some("new".to_string())
                }
            })
            .await
            .unwrap();

        assert_eq!(value.as_deref(), Some("new"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stored = backend.read("k").await.unwrap().unwrap();
        assert_eq!(stored.value(), Some("new"));

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.stale_refreshes, 0);
    }

    #[tokio::test]
    async fn test_stale_window_serves_old_value_while_recomputing() {
        let backend = Arc::new(MemoryBackend::new());
        let cache = RateCache::new(Arc::clone(&backend));
        let options = FetchOptions::new().with_stale_window(Duration::from_secs(10));
        let now = Utc::now();

        backend
            .write(
                "k",
                CacheEntry::with_timestamps(
                    Some("old".to_string()),
                    now - chrono::Duration::minutes(10),
                    now - chrono::Duration::seconds(2),
                ),
            )
            .await
            .unwrap();

        let started = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());

        let refresher = tokio::spawn({
            let cache = cache.clone();
            let options = options.clone();
            let started = Arc::clone(&started);
            let gate = Arc::clone(&gate);
            async move {
                cache
                    .fetch_or_compute("k", options, async move {
                        started.notify_one();
                        gate.notified().await;
                        Some("new".to_string())
                    })
                    .await
            }
        });

        started.notified().await;

        // While the refresher computes, other callers read the stale value
        // without blocking and without computing.
        let stale_calls = Arc::new(AtomicUsize::new(0));
        let stale = cache
            .fetch_or_compute("k", options.clone(), {
                let stale_calls = Arc::clone(&stale_calls);
                async move {
                    stale_calls.fetch_add(1, Ordering::SeqCst);
                    Some("unexpected".to_string())
                }
            })
            .await
            .unwrap();
        assert_eq!(stale.as_deref(), Some("old"));
        assert_eq!(stale_calls.load(Ordering::SeqCst), 0);

        gate.notify_one();
        let refreshed = refresher.await.unwrap().unwrap();
        assert_eq!(refreshed.as_deref(), Some("new"));

        // The refreshed value answers later fetches.
        let later_calls = Arc::new(AtomicUsize::new(0));
        let after = cache
            .fetch_or_compute("k", options, {
                let later_calls = Arc::clone(&later_calls);
                async move {
                    later_calls.fetch_add(1, Ordering::SeqCst);
                    Some("later".to_string())
                }
            })
            .await
            .unwrap();
        assert_eq!(after.as_deref(), Some("new"));
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.stale_refreshes, 1);
    }

    #[tokio::test]
    async fn test_zero_stale_window_makes_callers_wait_for_fresh_value() {
        let backend = Arc::new(MemoryBackend::new());
        let cache = RateCache::new(Arc::clone(&backend));
        let options = FetchOptions::new().with_stale_window(Duration::ZERO);
        let now = Utc::now();

        backend
            .write(
                "k",
                CacheEntry::with_timestamps(
                    Some("old".to_string()),
                    now - chrono::Duration::minutes(10),
                    now - chrono::Duration::seconds(2),
                ),
            )
            .await
            .unwrap();

        let started = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());

        let refresher = tokio::spawn({
            let cache = cache.clone();
            let options = options.clone();
            let started = Arc::clone(&started);
            let gate = Arc::clone(&gate);
            async move {
                cache
                    .fetch_or_compute("k", options, async move {
                        started.notify_one();
                        gate.notified().await;
                        Some("new".to_string())
                    })
                    .await
            }
        });

        started.notified().await;

        // With stale serving disabled the second caller blocks until the
        // refresher stores the fresh value, then reuses it.
        let waiter = tokio::spawn({
            let cache = cache.clone();
            let options = options.clone();
            async move {
                cache
                    .fetch_or_compute("k", options, async { Some("unexpected".to_string()) })
                    .await
            }
        });

        gate.notify_one();
        assert_eq!(
            refresher.await.unwrap().unwrap().as_deref(),
            Some("new")
        );
        assert_eq!(waiter.await.unwrap().unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_cold_burst_runs_compute_once() {
        let cache = RateCache::new(Arc::new(MemoryBackend::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .fetch_or_compute("k", FetchOptions::new(), async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Some("15000".to_string())
                    })
                    .await
            }));
        }

        for handle in handles {
            let value = handle.await.unwrap().unwrap();
            assert_eq!(value.as_deref(), Some("15000"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 7);
    }

    #[tokio::test]
    async fn test_absent_result_lets_waiting_caller_recompute() {
        let backend = Arc::new(MemoryBackend::new());
        let cache = RateCache::new(Arc::clone(&backend));
        let calls = Arc::new(AtomicUsize::new(0));

        let started = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());

        let first = tokio::spawn({
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            let started = Arc::clone(&started);
            let gate = Arc::clone(&gate);
            async move {
                cache
                    .fetch_or_compute("k", FetchOptions::new(), async move {
                        started.notify_one();
                        gate.notified().await;
                        calls.fetch_add(1, Ordering::SeqCst);
                        None
                    })
                    .await
            }
        });

        started.notified().await;

        let second = tokio::spawn({
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            async move {
                cache
                    .fetch_or_compute("k", FetchOptions::new(), async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Some("second".to_string())
                    })
                    .await
            }
        });

        gate.notify_one();

        // The first caller found nothing and stored nothing, so the waiting
        // caller runs its own compute instead of reusing an absent result.
        assert_eq!(first.await.unwrap().unwrap(), None);
        assert_eq!(
            second.await.unwrap().unwrap().as_deref(),
            Some("second")
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_recompute() {
        let cache = RateCache::new(Arc::new(MemoryBackend::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            cache
                .fetch_or_compute("k", FetchOptions::new(), {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Some("15000".to_string())
                    }
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate("k").await.unwrap();

        cache
            .fetch_or_compute("k", FetchOptions::new(), {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Some("15000".to_string())
                }
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_guard_slot_released_after_fetch() {
        let cache = RateCache::new(Arc::new(MemoryBackend::new()));

        cache
            .fetch_or_compute("k", FetchOptions::new(), async {
                Some("15000".to_string())
            })
            .await
            .unwrap();

        assert!(cache.in_flight.lock().await.is_empty());
    }
}
