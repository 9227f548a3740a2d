//! Weather widget model.
//!
//! A consumer of the resource manager: it binds one subscription to
//! `<api_base>/current?query=<city>` and derives what the widget shows.

pub mod mock;
pub mod response;

pub use mock::{MOCK_DELAY, MockWeatherFetcher, mock_report};
pub use response::{WeatherApiResponse, WeatherReport, condition_emoji};

use crate::fetch::endpoint;
use crate::resource::{FetchOptions, ResourceManager, ResourceState, Subscription};
use folio_core::{AppConfig, Error};
use std::future::Future;
use tokio::sync::watch;

/// Headline shown when the weather cannot be loaded.
pub const ERROR_HEADLINE: &str = "Unable to fetch weather data";

/// Build the resource key for `city`.
pub fn weather_url(api_base: &str, city: &str) -> Result<String, Error> {
    endpoint(api_base, "current", &[("query", city.trim())]).map_err(|e| Error::InvalidUrl(e.to_string()))
}

/// What the widget renders.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherView {
    Idle,
    Loading,
    /// Nothing to show; offer a retry.
    Error { headline: &'static str, detail: String },
    Ready {
        report: WeatherReport,
        /// A silent revalidation is in flight.
        refreshing: bool,
        /// The last revalidation failed; `report` is the last good data.
        stale_error: Option<String>,
    },
}

impl WeatherView {
    pub fn from_state(state: &ResourceState<WeatherApiResponse>) -> Self {
        if state.loading {
            return WeatherView::Loading;
        }
        match (&state.data, &state.error) {
            (Some(data), error) => WeatherView::Ready {
                report: WeatherReport::from(data),
                refreshing: state.is_refetching,
                stale_error: error.clone(),
            },
            (None, Some(error)) => WeatherView::Error { headline: ERROR_HEADLINE, detail: error.clone() },
            (None, None) if state.is_refetching => WeatherView::Loading,
            (None, None) => WeatherView::Idle,
        }
    }
}

/// The weather card: a city plus the subscription for it.
pub struct WeatherWidget {
    api_base: String,
    city: String,
    options: FetchOptions<WeatherApiResponse>,
    subscription: Subscription<WeatherApiResponse>,
}

impl WeatherWidget {
    /// Mount the widget for the configured default city.
    pub fn new(manager: &ResourceManager, config: &AppConfig) -> Result<Self, Error> {
        Self::with_options(manager, config, FetchOptions::from_config(config))
    }

    pub fn with_options(
        manager: &ResourceManager, config: &AppConfig, options: FetchOptions<WeatherApiResponse>,
    ) -> Result<Self, Error> {
        let api_base = config.weather.api_base.clone();
        let city = config.weather.default_city.trim().to_string();
        let key = weather_url(&api_base, &city)?;
        let subscription = manager.subscribe(Some(&key), options.clone());
        Ok(Self { api_base, city, options, subscription })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Search for another city.
    ///
    /// Blank input is ignored. Returns whether the city changed.
    pub fn set_city(&mut self, input: &str) -> Result<bool, Error> {
        let city = input.trim();
        if city.is_empty() || city == self.city {
            return Ok(false);
        }

        let key = weather_url(&self.api_base, city)?;
        tracing::debug!(city, "weather location changed");
        self.city = city.to_string();
        self.subscription.update(Some(&key), self.options.clone());
        Ok(true)
    }

    pub fn view(&self) -> WeatherView {
        WeatherView::from_state(&self.subscription.state())
    }

    pub fn state(&self) -> ResourceState<WeatherApiResponse> {
        self.subscription.state()
    }

    pub fn watch(&self) -> watch::Receiver<ResourceState<WeatherApiResponse>> {
        self.subscription.watch()
    }

    /// Manual refresh / "Try Again".
    pub fn refresh(&self) -> impl Future<Output = ()> + Send + use<> {
        self.subscription.refetch()
    }
}
