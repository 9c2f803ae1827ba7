//! Cache backend trait and usage statistics.
//!
//! This module defines the trait that must be implemented by cache backends.
//! The store layers its expiry and stampede policy on top of these primitive
//! operations, so backends stay dumb: they hold entries, they never interpret
//! timestamps.

use async_trait::async_trait;
use tariff_core::TariffResult;

use crate::entry::CacheEntry;

/// Cache backend trait for pluggable cache implementations.
///
/// This trait abstracts over different cache backends (e.g., in-memory,
/// Redis). Implementations must be thread-safe and support concurrent
/// access.
///
/// # Expiry
///
/// Backends return entries whether or not they have expired. Deciding what
/// an expired entry means (recompute, serve stale, drop) is the store's job,
/// so `read` must not filter by timestamp.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get the entry stored under `key`, expired or not.
    async fn read(&self, key: &str) -> TariffResult<Option<CacheEntry>>;

    /// Store `entry` under `key`, replacing any previous entry.
    async fn write(&self, key: &str, entry: CacheEntry) -> TariffResult<()>;

    /// Remove the entry under `key`, if any.
    async fn remove(&self, key: &str) -> TariffResult<()>;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of fetches answered from an unexpired entry. Stale values
    /// served during a recompute window count here too.
    pub hits: u64,
    /// Number of fetches that ran the compute function.
    pub misses: u64,
    /// Number of recomputes that re-armed an expired entry so concurrent
    /// callers could keep reading the stale value.
    pub stale_refreshes: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }
}
