//! Query, record, and outcome types for rate resolution.

use serde::{Deserialize, Serialize};

use crate::status::ErrorStatus;

/// A single rate lookup: one period, hotel, and room combination.
///
/// Identity is value equality over all three fields. The cache key for a
/// query is derived from the same fields, so equal queries always share a
/// cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateQuery {
    pub period: String,
    pub hotel: String,
    pub room: String,
}

impl RateQuery {
    /// Create a new query triple.
    pub fn new(
        period: impl Into<String>,
        hotel: impl Into<String>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            period: period.into(),
            hotel: hotel.into(),
            room: room.into(),
        }
    }
}

/// One price quotation from the upstream pricing service.
///
/// The rate is an opaque string. Currency and formatting are the upstream's
/// business and are passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRecord {
    pub period: String,
    pub hotel: String,
    pub room: String,
    pub rate: String,
}

impl RateRecord {
    /// Whether this record answers the given query.
    pub fn matches(&self, query: &RateQuery) -> bool {
        self.period == query.period && self.hotel == query.hotel && self.room == query.room
    }
}

/// Outcome of a single `resolve` call.
///
/// Failures are carried as data rather than raised: `error_status`
/// classifies what went wrong and `errors` holds the human-readable
/// messages in the order they were recorded. Created per call and owned by
/// the caller; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The matched rate, when resolution succeeded.
    pub rate: Option<String>,
    /// Classification of the failure, when resolution did not succeed.
    pub error_status: Option<ErrorStatus>,
    /// Human-readable error messages.
    pub errors: Vec<String>,
}

impl Resolution {
    /// True when no errors were recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}
