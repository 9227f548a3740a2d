//! Weather API wire types and normalization.

use serde::{Deserialize, Serialize};

/// Raw response from `GET <api_base>/current?query=<city>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherApiResponse {
    pub result: WeatherResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub location: Location,
    pub current: Current,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    pub temp_f: f64,
    pub condition: Condition,
    pub humidity: u32,
    pub wind_mph: f64,
    pub feelslike_f: f64,
    pub uv: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
}

/// Normalized report, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    /// "<name>, <region>"
    pub location: String,
    pub country: String,
    pub temperature_f: f64,
    pub feels_like_f: f64,
    pub condition: String,
    pub icon_url: String,
    pub humidity: u32,
    pub wind_mph: f64,
    pub uv: f64,
    pub emoji: &'static str,
}

impl From<&WeatherApiResponse> for WeatherReport {
    fn from(raw: &WeatherApiResponse) -> Self {
        let WeatherResult { location, current } = &raw.result;
        Self {
            location: format!("{}, {}", location.name, location.region),
            country: location.country.clone(),
            temperature_f: current.temp_f,
            feels_like_f: current.feelslike_f,
            condition: current.condition.text.clone(),
            icon_url: absolute_icon_url(&current.condition.icon),
            humidity: current.humidity,
            wind_mph: current.wind_mph,
            uv: current.uv,
            emoji: condition_emoji(&current.condition.text),
        }
    }
}

impl WeatherReport {
    pub fn temperature_label(&self) -> String {
        format!("{}°F", self.temperature_f)
    }

    pub fn feels_like_label(&self) -> String {
        format!("Feels like {}°F", self.feels_like_f)
    }

    pub fn humidity_label(&self) -> String {
        format!("{}%", self.humidity)
    }

    pub fn wind_label(&self) -> String {
        format!("{} mph", self.wind_mph)
    }
}

/// The API hands out protocol-relative icon URLs.
fn absolute_icon_url(icon: &str) -> String {
    if icon.starts_with("//") { format!("https:{icon}") } else { icon.to_string() }
}

/// Pick an emoji for a free-text condition description.
pub fn condition_emoji(condition: &str) -> &'static str {
    let c = condition.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| c.contains(w));

    if has(&["thunder", "storm"]) {
        "⛈️"
    } else if has(&["partly"]) {
        "⛅"
    } else if has(&["sunny", "clear"]) {
        "☀️"
    } else if has(&["cloud", "overcast"]) {
        "☁️"
    } else if has(&["rain", "drizzle", "shower"]) {
        "🌧️"
    } else if has(&["snow", "sleet", "blizzard", "ice"]) {
        "❄️"
    } else if has(&["fog", "mist", "haze"]) {
        "🌫️"
    } else {
        "🌤️"
    }
}
