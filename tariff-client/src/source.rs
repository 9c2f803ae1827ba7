//! Rate source trait and response model.

use async_trait::async_trait;
use tariff_core::{RateQuery, RateRecord, SourceError};

/// Decoded body of a rate service response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatePayload {
    /// Rate sheet from a successful call. May be empty when nothing is
    /// priced for the requested attributes.
    Rates(Vec<RateRecord>),
    /// Error body from a rejected call. `message` is None when the service
    /// did not explain itself.
    Error { message: Option<String> },
}

/// A response that arrived from the rate service.
///
/// Non-success responses are still responses. The status code travels with
/// the payload so callers can classify rejections themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateResponse {
    status: u16,
    payload: RatePayload,
}

impl RateResponse {
    pub fn new(status: u16, payload: RatePayload) -> Self {
        Self { status, payload }
    }

    /// HTTP status the response arrived with.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn payload(&self) -> &RatePayload {
        &self.payload
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The rate sheet, when the call succeeded.
    pub fn rates(&self) -> Option<&[RateRecord]> {
        match &self.payload {
            RatePayload::Rates(rates) => Some(rates),
            RatePayload::Error { .. } => None,
        }
    }

    /// The service's explanation, when the call was rejected with one.
    pub fn error_message(&self) -> Option<&str> {
        match &self.payload {
            RatePayload::Error { message } => message.as_deref(),
            RatePayload::Rates(_) => None,
        }
    }
}

/// Upstream source of room rates.
///
/// Implementations resolve transport faults as errors. Any response that
/// arrived, success or rejection, is `Ok`.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Ask the service to price `query`.
    async fn get_rate(&self, query: &RateQuery) -> Result<RateResponse, SourceError>;
}
