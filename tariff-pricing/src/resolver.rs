//! Cached rate resolution.
//!
//! This module implements the resolution pipeline: derive the cache key,
//! fetch through the store, and on a recompute call the rate service and
//! fold whatever comes back into a [`Resolution`]. Upstream rejections,
//! transport faults, and undecodable bodies all classify onto the error
//! taxonomy instead of propagating.

use std::sync::Arc;

use tariff_cache::{CacheBackend, FetchOptions, MemoryBackend, RateCache};
use tariff_client::{HttpRateSource, RateSource};
use tariff_core::{ErrorStatus, PricingConfig, RateQuery, Resolution, TariffResult};

use crate::key::derive_cache_key;

/// Resolves room rates through the cache, falling back to the rate service.
///
/// `resolve` is total: every outcome, including upstream faults, comes back
/// as a [`Resolution`]. A resolution with an empty error list carries the
/// rate (or carries nothing when the service priced nothing); one with
/// errors carries the classified status and a presentable message.
///
/// Cloning is cheap and all clones share the cache and the source.
pub struct RateResolver<B, S>
where
    B: CacheBackend,
    S: RateSource,
{
    /// The fetch-or-compute store.
    cache: RateCache<B>,
    /// The upstream rate service.
    source: Arc<S>,
    /// TTL, stale window, and service connection settings.
    config: PricingConfig,
}

impl RateResolver<MemoryBackend, HttpRateSource> {
    /// Build a resolver over the in-memory backend and the HTTP source.
    ///
    /// Validates `config` first so a blank base URL or a zero timeout is
    /// reported at construction instead of on the first lookup.
    pub fn from_config(config: PricingConfig) -> TariffResult<Self> {
        config.validate()?;
        let source = HttpRateSource::new(&config)?;
        let cache = RateCache::new(Arc::new(MemoryBackend::new()));
        Ok(Self::new(cache, Arc::new(source), config))
    }
}

impl<B, S> RateResolver<B, S>
where
    B: CacheBackend,
    S: RateSource,
{
    /// Create a resolver from its parts.
    pub fn new(cache: RateCache<B>, source: Arc<S>, config: PricingConfig) -> Self {
        Self {
            cache,
            source,
            config,
        }
    }

    /// Get the cache store.
    pub fn cache(&self) -> &RateCache<B> {
        &self.cache
    }

    /// Get the resolver configuration.
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Resolve the rate for `query`.
    ///
    /// A fresh cache entry answers without touching the rate service. On a
    /// miss or after expiry the service is called once, concurrent callers
    /// for the same query being held off by the store. An absent outcome,
    /// whether an unmatched query or a classified failure, is never cached,
    /// so the next call retries the service.
    pub async fn resolve(&self, query: &RateQuery) -> Resolution {
        let key = derive_cache_key(query);
        let options = FetchOptions::new()
            .with_ttl(self.config.cache_ttl)
            .with_stale_window(self.config.stale_window);

        let mut errors: Vec<String> = Vec::new();
        let mut error_status: Option<ErrorStatus> = None;

        let fetched = self
            .cache
            .fetch_or_compute(&key, options, self.fetch_rate(query, &mut errors, &mut error_status))
            .await;

        match fetched {
            Ok(rate) => Resolution {
                rate,
                error_status,
                errors,
            },
            Err(error) => {
                tracing::error!(error = %error, "Cache store failed during rate resolution");
                let status = ErrorStatus::InternalServerError;
                Resolution {
                    rate: None,
                    error_status: Some(status),
                    errors: vec![status.default_message().to_string()],
                }
            }
        }
    }

    /// Resolve from bare query parts.
    pub async fn resolve_parts(
        &self,
        period: impl Into<String>,
        hotel: impl Into<String>,
        room: impl Into<String>,
    ) -> Resolution {
        self.resolve(&RateQuery::new(period, hotel, room)).await
    }

    /// Drop the cached rate for `query`, forcing the next resolve to call
    /// the rate service.
    pub async fn invalidate(&self, query: &RateQuery) -> TariffResult<()> {
        self.cache.invalidate(&derive_cache_key(query)).await
    }

    /// Call the rate service and classify the outcome.
    ///
    /// Runs only when the store decided to recompute. Returns the matched
    /// rate, or `None` with the classification written into `errors` and
    /// `error_status`.
    async fn fetch_rate(
        &self,
        query: &RateQuery,
        errors: &mut Vec<String>,
        error_status: &mut Option<ErrorStatus>,
    ) -> Option<String> {
        match self.source.get_rate(query).await {
            Ok(response) if response.is_success() => {
                let rate = response
                    .rates()
                    .and_then(|rates| rates.iter().find(|record| record.matches(query)))
                    .map(|record| record.rate.clone());

                if rate.is_none() {
                    let status = ErrorStatus::NotFound;
                    tracing::debug!(
                        period = %query.period,
                        hotel = %query.hotel,
                        room = %query.room,
                        "No rate matched the query"
                    );
                    *error_status = Some(status);
                    errors.push(status.default_message().to_string());
                }

                rate
            }
            Ok(response) => {
                let status = ErrorStatus::from_status_code(response.status());
                let message = response
                    .error_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.default_message().to_string());

                tracing::debug!(
                    status_code = response.status(),
                    classified = %status,
                    "Rate service rejected the query"
                );
                *error_status = Some(status);
                errors.push(message);
                None
            }
            Err(fault) => {
                let status = ErrorStatus::from_source_error(&fault);
                match status {
                    ErrorStatus::InternalServerError => {
                        tracing::error!(error = %fault, "Rate lookup failed unexpectedly");
                    }
                    _ => {
                        tracing::warn!(error = %fault, "Rate service unreachable");
                    }
                }
                *error_status = Some(status);
                errors.push(status.default_message().to_string());
                None
            }
        }
    }
}

impl<B, S> Clone for RateResolver<B, S>
where
    B: CacheBackend,
    S: RateSource,
{
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            source: Arc::clone(&self.source),
            config: self.config.clone(),
        }
    }
}

// ===== TESTS =====
