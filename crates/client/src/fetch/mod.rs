//! HTTP transport used by the resource manager.
//!
//! ### Contract
//! - GET the resource key (an absolute http(s) URL), asking for JSON.
//! - Transport failures surface as [`Error::Network`] carrying the
//!   underlying message; timeouts read `request timed out`.
//! - Non-2xx responses are *returned*, not raised: turning a status into
//!   `HTTP <status>: <statusText>` is the caller's job, so scripted
//!   transports in tests exercise the same path.

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode, header};
use serde_json::Value;
use std::time::{Duration, Instant};

pub use url::{UrlError, endpoint, parse_resource_url};

use folio_core::{AppConfig, Error};

/// Something that can fetch a resource key.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<FetchResponse, Error>;
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "folio/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "folio/0.1".to_string(), timeout: Duration::from_millis(20000) }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout() }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Reason phrase for the status (e.g. "Not Found")
    pub status_text: String,
    /// Response body bytes
    pub body: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Build a response using the canonical reason phrase for `status`.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: reason_phrase(status).to_string(),
            body: body.into(),
            fetch_ms: 0,
        }
    }

    /// Convert into the decoded JSON body, or the HTTP/decode error.
    pub fn into_json(self) -> Result<Value, Error> {
        if !self.status.is_success() {
            return Err(Error::http(self.status.as_u16(), self.status_text));
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Fetch `key` and decode the body as JSON.
pub async fn fetch_json(fetcher: &dyn Fetcher, key: &str) -> Result<Value, Error> {
    fetcher.fetch(key).await?.into_json()
}

/// Canonical reason for `status`, or a placeholder for non-standard codes.
fn reason_phrase(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown Status")
}

fn network_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::Network("request timed out".to_string()) } else { Error::Network(err.to_string()) }
}

/// reqwest-backed [`Fetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, key: &str) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = parse_resource_url(key).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(network_error)?;
        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(key, status = status.as_u16(), fetch_ms, bytes = body.len(), "fetched resource");

        Ok(FetchResponse {
            status,
            status_text: reason_phrase(status).to_string(),
            body,
            fetch_ms,
        })
    }
}
