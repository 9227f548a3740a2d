//! Canned weather source used until a real API is configured.
//!
//! Implements [`Fetcher`] so the widget goes through the exact same
//! subscription path as the HTTP source, including caching and polling.

use super::response::{Condition, Current, Location, WeatherApiResponse, WeatherResult};
use crate::fetch::{FetchResponse, Fetcher, parse_resource_url};
use async_trait::async_trait;
use folio_core::Error;
use reqwest::StatusCode;
use std::time::Duration;

/// Simulated latency before a canned report is served.
pub const MOCK_DELAY: Duration = Duration::from_millis(1500);

struct Canned {
    name: &'static str,
    region: &'static str,
    temp_f: f64,
    feelslike_f: f64,
    condition: &'static str,
    icon: &'static str,
    humidity: u32,
    wind_mph: f64,
    uv: f64,
}

static CANNED: [Canned; 3] = [
    Canned {
        name: "San Francisco",
        region: "CA",
        temp_f: 72.0,
        feelslike_f: 75.0,
        condition: "Partly Cloudy",
        icon: "//cdn.weatherapi.com/weather/64x64/day/116.png",
        humidity: 65,
        wind_mph: 8.0,
        uv: 6.0,
    },
    Canned {
        name: "New York",
        region: "NY",
        temp_f: 68.0,
        feelslike_f: 70.0,
        condition: "Sunny",
        icon: "//cdn.weatherapi.com/weather/64x64/day/113.png",
        humidity: 55,
        wind_mph: 12.0,
        uv: 7.0,
    },
    Canned {
        name: "Seattle",
        region: "WA",
        temp_f: 63.0,
        feelslike_f: 61.0,
        condition: "Rainy",
        icon: "//cdn.weatherapi.com/weather/64x64/day/296.png",
        humidity: 80,
        wind_mph: 6.0,
        uv: 2.0,
    },
];

impl Canned {
    fn to_response(&self) -> WeatherApiResponse {
        WeatherApiResponse {
            result: WeatherResult {
                location: Location {
                    name: self.name.to_string(),
                    region: self.region.to_string(),
                    country: "United States".to_string(),
                },
                current: Current {
                    temp_f: self.temp_f,
                    condition: Condition { text: self.condition.to_string(), icon: self.icon.to_string() },
                    humidity: self.humidity,
                    wind_mph: self.wind_mph,
                    feelslike_f: self.feelslike_f,
                    uv: self.uv,
                },
            },
        }
    }
}

/// The canned report for `city` (case-insensitive), or the first one.
pub fn mock_report(city: &str) -> WeatherApiResponse {
    let city = city.trim();
    CANNED
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(city))
        .unwrap_or(&CANNED[0])
        .to_response()
}

/// Serves [`mock_report`] for the `query` parameter of the requested key.
#[derive(Debug, Clone)]
pub struct MockWeatherFetcher {
    delay: Duration,
}

impl Default for MockWeatherFetcher {
    fn default() -> Self {
        Self { delay: MOCK_DELAY }
    }
}

impl MockWeatherFetcher {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Fetcher for MockWeatherFetcher {
    async fn fetch(&self, key: &str) -> Result<FetchResponse, Error> {
        let url = parse_resource_url(key).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let city = url
            .query_pairs()
            .find(|(name, _)| name == "query")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();

        tokio::time::sleep(self.delay).await;

        let body = serde_json::to_vec(&mock_report(&city))?;
        tracing::debug!(key, city = %city, "serving mock weather");
        Ok(FetchResponse::new(StatusCode::OK, body))
    }
}
