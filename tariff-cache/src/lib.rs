//! Tariff Cache - Fetch-or-Compute Store
//!
//! Caching layer for resolved room rates. The store wraps a pluggable
//! backend and adds the expiry policy on top: values are fetched from the
//! backend when fresh, recomputed when missing or expired, and briefly
//! served stale while a recompute is in flight so that a burst of callers
//! does not stampede the upstream rate service.
//!
//! # Design Philosophy
//!
//! - **Backend-agnostic**: the store speaks to a [`CacheBackend`] trait;
//!   the in-memory backend is the default, anything keyed by string works.
//! - **Stampede protection**: per-key guards make sure one caller computes
//!   while the rest either wait (cold miss) or read the stale value
//!   (expiry within the stale window).
//! - **Absent results are first-class**: a compute may legitimately find
//!   nothing. Callers choose whether that outcome is cached or retried.

pub mod backend;
pub mod entry;
pub mod memory;
pub mod store;

pub use backend::{CacheBackend, CacheStats};
pub use entry::CacheEntry;
pub use memory::MemoryBackend;
pub use store::{FetchOptions, RateCache};
