//! Tariff Core - Shared Types
//!
//! Data types, error taxonomy, and configuration shared by the tariff crates.
//! This crate contains no I/O; transport and storage live in `tariff-client`
//! and `tariff-cache`.

pub mod config;
pub mod error;
pub mod status;
pub mod types;

pub use config::PricingConfig;
pub use error::{CacheError, ConfigError, SourceError, TariffError, TariffResult};
pub use status::ErrorStatus;
pub use types::{RateQuery, RateRecord, Resolution};
