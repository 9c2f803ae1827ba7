//! Tariff Client - Upstream Rate Service Access
//!
//! HTTP access to the room-rate service. The client speaks the service's
//! JSON protocol and reports transport faults as `SourceError`s. A response
//! that arrived is returned whatever its status; distinguishing a rejection
//! from an outage is the caller's decision, made from the status code.

pub mod http;
pub mod source;
pub mod types;

pub use http::HttpRateSource;
pub use source::{RatePayload, RateResponse, RateSource};
pub use types::{ErrorBody, RateAttributes, RateRequest, RateSheet};
