//! Error types for tariff operations

use thiserror::Error;

/// Faults raised while calling the upstream rate service.
///
/// These describe how a call failed, not what the upstream answered: a
/// response that arrived with a non-success status is still a response, and
/// is classified from its status code rather than represented here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Request to the rate service timed out")]
    Timeout,

    #[error("Could not connect to the rate service: {reason}")]
    Connection { reason: String },

    #[error("Transport failure while calling the rate service: {reason}")]
    Transport { reason: String },

    #[error("Invalid response body from the rate service: {reason}")]
    InvalidBody { reason: String },
}

/// Cache store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache backend failure during {operation}: {reason}")]
    Backend { operation: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all tariff errors.
#[derive(Debug, Clone, Error)]
pub enum TariffError {
    #[error("Rate source error: {0}")]
    Source(#[from] SourceError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for tariff operations.
pub type TariffResult<T> = Result<T, TariffError>;

// =============================================================================
// TESTS
// =============================================================================
