//! Tariff Pricing - Cached Room-Rate Resolution
//!
//! Resolves the rate for a (period, hotel, room) query through the cache,
//! calling the upstream rate service only on a miss or after expiry.
//! Upstream failures never escape: they are classified into a small stable
//! error taxonomy carried on the returned resolution.
//!
//! # Design Philosophy
//!
//! - **Resolution is total**: `resolve` always returns a presentable
//!   outcome. Callers branch on the resolution's validity, not on errors.
//! - **The cache owns coordination**: the resolver keeps no state between
//!   calls; stampede protection and expiry live in the store.
//! - **Absent is not a value worth keeping**: a query that produced no
//!   rate, for whatever reason, is retried on the very next call.

pub mod key;
pub mod resolver;

pub use key::derive_cache_key;
pub use resolver::RateResolver;
