//! In-memory cache backend.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use tariff_core::TariffResult;

use crate::backend::CacheBackend;
use crate::entry::CacheEntry;

/// In-memory backend over a hash map.
///
/// Suitable for single-process deployments and tests. Expired entries are
/// dropped lazily when the store replaces them; long-running processes can
/// also call [`purge_expired`](MemoryBackend::purge_expired) periodically
/// to bound memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently stored, expired or not.
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Drop entries whose expiry passed more than `grace` ago.
    ///
    /// Entries still within `grace` of their expiry are kept because the
    /// store may serve them stale during a recompute. Returns the number of
    /// entries removed.
    pub async fn purge_expired(&self, grace: Duration) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now) || entry.in_stale_window(now, grace));
        before - entries.len()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn read(&self, key: &str) -> TariffResult<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, entry: CacheEntry) -> TariffResult<()> {
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> TariffResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

// ===== TESTS =====
