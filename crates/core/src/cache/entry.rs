//! A single cached response payload.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

/// Cached payload for one resource key.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The resource key this payload was fetched from.
    pub key: String,
    /// Decoded JSON body of the successful response.
    pub payload: Value,
    /// Monotonic store time, used for freshness checks.
    pub stored_at: Instant,
    /// Wall-clock store time, for display and logs.
    pub stored_at_utc: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, payload: Value) -> Self {
        Self { key: key.into(), payload, stored_at: Instant::now(), stored_at_utc: Utc::now() }
    }

    /// Time elapsed since the entry was stored.
    pub fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }

    /// Whether the entry is still within the given cache window.
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        self.age() < max_age
    }
}
