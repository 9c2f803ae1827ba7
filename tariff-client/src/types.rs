//! Rate service request and response bodies

use serde::{Deserialize, Serialize};
use tariff_core::{RateQuery, RateRecord};

// ============================================================================
// REQUEST TYPES
// ============================================================================

/// Body of a pricing call.
///
/// The service accepts a batch of attribute sets. Callers here always send
/// one per request so results stay independently cacheable.
#[derive(Debug, Clone, Serialize)]
pub struct RateRequest {
    pub attributes: Vec<RateAttributes>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RateAttributes {
    pub period: String,
    pub hotel: String,
    pub room: String,
}

impl RateRequest {
    /// Build a single-query request.
    pub fn for_query(query: &RateQuery) -> Self {
        Self {
            attributes: vec![RateAttributes {
                period: query.period.clone(),
                hotel: query.hotel.clone(),
                room: query.room.clone(),
            }],
        }
    }
}

// ============================================================================
// RESPONSE TYPES
// ============================================================================

/// Successful response body: the rate sheet for the requested attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct RateSheet {
    pub rates: Vec<RateRecord>,
}

/// Error response body. The service explains rejections under an `error`
/// key, though not on every status.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}
