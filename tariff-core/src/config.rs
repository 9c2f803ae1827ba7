//! Configuration for the rate resolver and its upstream client.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ConfigError, TariffError, TariffResult};

/// Configuration for rate resolution.
///
/// Injected at construction into both the resolver and the upstream client;
/// nothing reads process globals at call time.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Base URL of the upstream pricing service.
    pub base_url: String,
    /// Static credential forwarded in the `token` header.
    pub api_token: String,
    /// Overall timeout for one upstream request.
    pub request_timeout: Duration,
    /// Timeout for establishing the upstream connection.
    pub connect_timeout: Duration,
    /// How long a successfully resolved rate stays cached.
    pub cache_ttl: Duration,
    /// Grace period after expiry during which a single caller recomputes
    /// while concurrent callers are served the stale value. Zero disables
    /// stale serving.
    pub stale_window: Duration,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_token: String::new(),
            request_timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_millis(500),
            cache_ttl: Duration::from_secs(300),
            stale_window: Duration::from_secs(10),
        }
    }
}

impl PricingConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the upstream base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the upstream credential.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = token.into();
        self
    }

    /// Set the overall request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the stale-serving window.
    pub fn with_stale_window(mut self, window: Duration) -> Self {
        self.stale_window = window;
        self
    }

    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `TARIFF_RATE_API_URL`: upstream base URL (default: http://localhost:8080)
    /// - `TARIFF_RATE_API_TOKEN`: upstream credential (default: empty)
    /// - `TARIFF_REQUEST_TIMEOUT_MS`: request timeout in milliseconds (default: 2000)
    /// - `TARIFF_CONNECT_TIMEOUT_MS`: connection timeout in milliseconds (default: 500)
    /// - `TARIFF_CACHE_TTL_SECS`: cache TTL in seconds (default: 300)
    /// - `TARIFF_STALE_WINDOW_SECS`: stale-serving window in seconds (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: std::env::var("TARIFF_RATE_API_URL").unwrap_or(defaults.base_url),
            api_token: std::env::var("TARIFF_RATE_API_TOKEN").unwrap_or(defaults.api_token),
            request_timeout: std::env::var("TARIFF_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            connect_timeout: std::env::var("TARIFF_CONNECT_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.connect_timeout),
            cache_ttl: std::env::var("TARIFF_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            stale_window: std::env::var("TARIFF_STALE_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.stale_window),
        }
    }

    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(TariffError::Config) if invalid.
    ///
    /// Validates:
    /// - base_url is non-empty
    /// - request_timeout, connect_timeout, and cache_ttl are positive
    ///
    /// A zero stale_window is legal; it turns stale serving off.
    pub fn validate(&self) -> TariffResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(TariffError::Config(ConfigError::MissingRequired {
                field: "base_url".to_string(),
            }));
        }

        if self.request_timeout.is_zero() {
            return Err(TariffError::Config(ConfigError::InvalidValue {
                field: "request_timeout".to_string(),
                value: format!("{:?}", self.request_timeout),
                reason: "request_timeout must be positive".to_string(),
            }));
        }

        if self.connect_timeout.is_zero() {
            return Err(TariffError::Config(ConfigError::InvalidValue {
                field: "connect_timeout".to_string(),
                value: format!("{:?}", self.connect_timeout),
                reason: "connect_timeout must be positive".to_string(),
            }));
        }

        if self.cache_ttl.is_zero() {
            return Err(TariffError::Config(ConfigError::InvalidValue {
                field: "cache_ttl".to_string(),
                value: format!("{:?}", self.cache_ttl),
                reason: "cache_ttl must be positive".to_string(),
            }));
        }

        Ok(())
    }
}

impl std::fmt::Debug for PricingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PricingConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("cache_ttl", &self.cache_ttl)
            .field("stale_window", &self.stale_window)
            .finish()
    }
}
