//! HTTP implementation of the rate source.

use async_trait::async_trait;
use reqwest::Client;
use tariff_core::{PricingConfig, RateQuery, SourceError, TariffResult};

use crate::source::{RatePayload, RateResponse, RateSource};
use crate::types::{ErrorBody, RateRequest, RateSheet};

/// HTTP client for the upstream rate service.
///
/// Authenticates with the service's `token` header and posts pricing
/// queries to its `/pricing` endpoint. Timeouts come from the config; the
/// connect timeout is deliberately short so a dead upstream is reported
/// quickly instead of tying up the full request budget.
pub struct HttpRateSource {
    client: Client,
    base_url: String,
    api_token: String,
}

impl HttpRateSource {
    /// Create a client from `config`.
    pub fn new(config: &PricingConfig) -> TariffResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| SourceError::Transport {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    /// Decode a response body into a payload.
    ///
    /// A success body must decode as a rate sheet; one that does not is an
    /// `InvalidBody` fault, since the caller cannot tell an empty sheet
    /// from garbage. Error bodies decode best-effort because the service
    /// does not explain every rejection with JSON.
    pub fn parse_response(status: u16, body: &str) -> Result<RateResponse, SourceError> {
        if (200..300).contains(&status) {
            let sheet: RateSheet =
                serde_json::from_str(body).map_err(|e| SourceError::InvalidBody {
                    reason: format!("undecodable rate sheet: {}", e),
                })?;
            Ok(RateResponse::new(status, RatePayload::Rates(sheet.rates)))
        } else {
            let message = serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(|b| b.error);
            Ok(RateResponse::new(status, RatePayload::Error { message }))
        }
    }

    fn classify_transport(err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_connect() {
            SourceError::Connection {
                reason: err.to_string(),
            }
        } else {
            SourceError::Transport {
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn get_rate(&self, query: &RateQuery) -> Result<RateResponse, SourceError> {
        let url = format!("{}/pricing", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("token", &self.api_token)
            .header("Content-Type", "application/json")
            .json(&RateRequest::for_query(query))
            .send()
            .await
            .map_err(Self::classify_transport)?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(Self::classify_transport)?;

        Self::parse_response(status, &body)
    }
}

impl std::fmt::Debug for HttpRateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRateSource")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

// ===== TESTS =====
