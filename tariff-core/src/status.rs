//! Error taxonomy for rate resolution outcomes.
//!
//! Upstream failures are heterogeneous: HTTP status families, network-level
//! faults, and malformed bodies. Callers see none of that variety; every
//! failure is classified onto this small stable taxonomy by the pure
//! mapping functions below.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SourceError;

/// Classification of a failed resolution.
///
/// Serialized in `snake_case` so the values read as `not_found`,
/// `bad_request`, `service_unavailable`, and `internal_server_error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStatus {
    /// The upstream answered successfully but carried no record matching
    /// the query.
    NotFound,

    /// The upstream rejected the request for a reason other than
    /// rate-limiting or a server-side fault. Not blindly retryable.
    BadRequest,

    /// The upstream was rate-limited, failed server-side, or could not be
    /// reached at all. Transient; callers may retry.
    ServiceUnavailable,

    /// An unexpected local fault, such as a response body that failed to
    /// parse.
    InternalServerError,
}

impl ErrorStatus {
    /// Classify a non-success upstream status code.
    ///
    /// Rate-limit responses and server faults are both transient from the
    /// caller's point of view, so 429 and the 5xx family fold into
    /// `ServiceUnavailable`. Every other non-2xx code means the request
    /// itself was rejected.
    pub fn from_status_code(status: u16) -> Self {
        match status {
            429 => ErrorStatus::ServiceUnavailable,
            500..=599 => ErrorStatus::ServiceUnavailable,
            _ => ErrorStatus::BadRequest,
        }
    }

    /// Classify a fault raised while calling the upstream.
    ///
    /// Network-class faults are indistinguishable from an unavailable
    /// service; anything else is a local problem.
    pub fn from_source_error(error: &SourceError) -> Self {
        match error {
            SourceError::Timeout
            | SourceError::Connection { .. }
            | SourceError::Transport { .. } => ErrorStatus::ServiceUnavailable,
            SourceError::InvalidBody { .. } => ErrorStatus::InternalServerError,
        }
    }

    /// Default user-facing message for this status.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorStatus::NotFound => {
                "No rate found for the selected period, hotel, and room combination."
            }
            ErrorStatus::BadRequest => "The rate service rejected the request.",
            ErrorStatus::ServiceUnavailable => "The rate service is temporarily unavailable.",
            ErrorStatus::InternalServerError => {
                "An unexpected error occurred while resolving the rate."
            }
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
