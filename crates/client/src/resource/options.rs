//! Per-subscription configuration.

use folio_core::{AppConfig, Error};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default freshness window for cache reuse (5 minutes).
pub const DEFAULT_CACHE_TIME: Duration = Duration::from_secs(5 * 60);

pub type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&Error) + Send + Sync>;

/// Options controlling how a subscription fetches and revalidates.
pub struct FetchOptions<T> {
    /// When false the subscription behaves as if it had no key.
    pub enabled: bool,
    /// How old a cached response may be and still be served on mount.
    pub cache_time: Duration,
    /// Revalidate when the application regains focus or visibility.
    pub refetch_on_focus: bool,
    /// Silent revalidation period while data is present.
    pub poll_interval: Option<Duration>,
    /// Called once per accepted successful attempt.
    pub on_success: Option<SuccessCallback<T>>,
    /// Called once per accepted failed attempt, with the original error.
    pub on_error: Option<ErrorCallback>,
}

impl<T> Default for FetchOptions<T> {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_time: DEFAULT_CACHE_TIME,
            refetch_on_focus: true,
            poll_interval: None,
            on_success: None,
            on_error: None,
        }
    }
}

impl<T> Clone for FetchOptions<T> {
    fn clone(&self) -> Self {
        Self {
            enabled: self.enabled,
            cache_time: self.cache_time,
            refetch_on_focus: self.refetch_on_focus,
            poll_interval: self.poll_interval,
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<T> fmt::Debug for FetchOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("enabled", &self.enabled)
            .field("cache_time", &self.cache_time)
            .field("refetch_on_focus", &self.refetch_on_focus)
            .field("poll_interval", &self.poll_interval)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl<T> FetchOptions<T> {
    /// Defaults taken from the application config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            cache_time: config.cache_time(),
            refetch_on_focus: config.refetch_on_focus,
            poll_interval: config.poll_interval().filter(|p| !p.is_zero()),
            ..Default::default()
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn cache_time(mut self, cache_time: Duration) -> Self {
        self.cache_time = cache_time;
        self
    }

    pub fn refetch_on_focus(mut self, refetch_on_focus: bool) -> Self {
        self.refetch_on_focus = refetch_on_focus;
        self
    }

    /// A zero interval disables polling.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = (!interval.is_zero()).then_some(interval);
        self
    }

    pub fn on_success(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }
}
