//! Unified error types for folio.
//!
//! Display strings are user-facing: they end up verbatim in a resource's
//! `error` field, so `Network` carries the transport message unchanged and
//! `Http` renders as `HTTP <status>: <statusText>`.

use crate::config::ConfigError;

/// Unified error types for fetches, decoding and email delivery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Transport failure (connection refused, DNS, offline, timeout).
    #[error("{0}")]
    Network(String),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },

    /// Response body was not the expected JSON.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request was aborted before it completed.
    #[error("request cancelled")]
    Cancelled,

    /// The resource key could not be used as a URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid input parameters (e.g., a blank contact field).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The email delivery service rejected or failed the submission.
    #[error("email delivery failed: {0}")]
    EmailDelivery(String),

    /// Required configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Stable code for log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Network(_) => "NETWORK_ERROR",
            Error::Http { .. } => "HTTP_ERROR",
            Error::Decode(_) => "DECODE_FAILED",
            Error::Cancelled => "CANCELLED",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::EmailDelivery(_) => "EMAIL_DELIVERY_FAILED",
            Error::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Cancellations are never surfaced to consumers.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Build an HTTP error from a status code and reason phrase.
    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        Error::Http { status, status_text: status_text.into() }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}
