//! Cache entries with explicit expiry.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// A single cached value together with its lifetime bounds.
///
/// The key lives in the backend map, entries only carry the value and its
/// timestamps. An entry holding `None` is a deliberately cached absent
/// result, written when a caller opted into storing those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    value: Option<String>,
    stored_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry that expires `ttl` from now.
    pub fn new(value: Option<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            value,
            stored_at: now,
            expires_at: now + ttl,
        }
    }

    /// Create an entry with explicit timestamps.
    pub fn with_timestamps(
        value: Option<String>,
        stored_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            value,
            stored_at,
            expires_at,
        }
    }

    /// The cached value, if the compute that produced it found one.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// When the entry was written.
    pub fn stored_at(&self) -> DateTime<Utc> {
        self.stored_at
    }

    /// When the entry stops being fresh.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the entry has expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the entry expired no more than `window` before `now`.
    ///
    /// Entries in this state are still servable: their value is stale but
    /// recent enough to hand out while a recompute is in flight. Returns
    /// false for unexpired entries.
    pub fn in_stale_window(&self, now: DateTime<Utc>, window: Duration) -> bool {
        if !self.is_expired_at(now) {
            return false;
        }
        let past_expiry = now
            .signed_duration_since(self.expires_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        past_expiry <= window
    }

    /// Push the expiry out to `now + window`.
    ///
    /// Used on an expired entry so concurrent readers keep getting the
    /// stale value while the caller that re-armed it recomputes.
    pub fn rearm(&mut self, now: DateTime<Utc>, window: Duration) {
        self.expires_at = now + window;
    }
}

// ===== TESTS =====
