//! Post-load checks for `AppConfig`: numeric ranges, endpoint URLs and
//! required strings. Email credentials are checked lazily on first send.

use crate::config::AppConfig;
use thiserror::Error;

/// Errors from loading or checking configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

/// Polls faster than this would hammer the weather API.
const MIN_POLL_INTERVAL_MS: u64 = 1_000;

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn require_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| invalid(field, &format!("not a valid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(field, &format!("unsupported scheme: {scheme}"))),
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `cache_time_ms` is 0
    /// - `poll_interval_ms` is set below one second
    /// - `user_agent` is empty
    /// - `weather.api_base` or `contact.endpoint` is not an http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.cache_time_ms == 0 {
            return Err(invalid("cache_time_ms", "must be greater than 0"));
        }

        if let Some(interval) = self.poll_interval_ms
            && interval < MIN_POLL_INTERVAL_MS
        {
            return Err(invalid("poll_interval_ms", "must be at least 1000ms"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        require_http_url("weather.api_base", &self.weather.api_base)?;
        require_http_url("contact.endpoint", &self.contact.endpoint)?;

        if self.weather.default_city.trim().is_empty() {
            return Err(invalid("weather.default_city", "must not be blank"));
        }

        if self.contact.status_reset_ms == 0 {
            tracing::warn!("contact.status_reset_ms is 0; submit status will reset immediately");
        }

        Ok(())
    }
}
