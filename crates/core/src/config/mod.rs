//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (FOLIO_*, nested keys split on `__`)
//! 2. TOML config file (if FOLIO_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Where the weather widget gets its data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSource {
    /// Canned reports served after a short simulated delay.
    Mock,
    /// The weather HTTP endpoint.
    Api,
}

/// Weather widget settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Set via FOLIO_WEATHER__SOURCE (`mock` or `api`).
    #[serde(default = "default_weather_source")]
    pub source: WeatherSource,

    /// Base URL of the weather API; `/current?query=<city>` is appended.
    ///
    /// Set via FOLIO_WEATHER__API_BASE environment variable.
    #[serde(default = "default_weather_api_base")]
    pub api_base: String,

    /// City shown before the visitor searches for one.
    #[serde(default = "default_city")]
    pub default_city: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self { source: default_weather_source(), api_base: default_weather_api_base(), default_city: default_city() }
    }
}

/// Contact form delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Transactional email API endpoint.
    #[serde(default = "default_contact_endpoint")]
    pub endpoint: String,

    /// Set via FOLIO_CONTACT__SERVICE_ID.
    #[serde(default)]
    pub service_id: Option<String>,

    /// Set via FOLIO_CONTACT__TEMPLATE_ID.
    #[serde(default)]
    pub template_id: Option<String>,

    /// Set via FOLIO_CONTACT__PUBLIC_KEY.
    #[serde(default)]
    pub public_key: Option<String>,

    /// Recipient address passed to the email template.
    #[serde(default = "default_to_email")]
    pub to_email: String,

    /// How long a success/error indicator stays up before resetting.
    #[serde(default = "default_status_reset_ms")]
    pub status_reset_ms: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            endpoint: default_contact_endpoint(),
            service_id: None,
            template_id: None,
            public_key: None,
            to_email: default_to_email(),
            status_reset_ms: default_status_reset_ms(),
        }
    }
}

/// Credentials needed to submit the contact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCredentials<'a> {
    pub service_id: &'a str,
    pub template_id: &'a str,
    pub public_key: &'a str,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (FOLIO_*)
/// 2. TOML config file (if FOLIO_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User-Agent string for HTTP requests.
    ///
    /// Set via FOLIO_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via FOLIO_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Freshness window for cached responses in milliseconds.
    ///
    /// Set via FOLIO_CACHE_TIME_MS environment variable.
    #[serde(default = "default_cache_time_ms")]
    pub cache_time_ms: u64,

    /// Whether regaining focus revalidates mounted resources.
    ///
    /// Set via FOLIO_REFETCH_ON_FOCUS environment variable.
    #[serde(default = "default_true")]
    pub refetch_on_focus: bool,

    /// Optional polling interval in milliseconds.
    ///
    /// Set via FOLIO_POLL_INTERVAL_MS environment variable.
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub contact: ContactConfig,
}

fn default_user_agent() -> String {
    "folio/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_cache_time_ms() -> u64 {
    5 * 60 * 1000
}

fn default_true() -> bool {
    true
}

fn default_weather_source() -> WeatherSource {
    WeatherSource::Mock
}

fn default_weather_api_base() -> String {
    "http://localhost:3000/api/weather".into()
}

fn default_city() -> String {
    "San Francisco".into()
}

fn default_contact_endpoint() -> String {
    "https://api.emailjs.com/api/v1.0/email/send".into()
}

fn default_to_email() -> String {
    "hello@example.com".into()
}

fn default_status_reset_ms() -> u64 {
    5_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            cache_time_ms: default_cache_time_ms(),
            refetch_on_focus: true,
            poll_interval_ms: None,
            weather: WeatherConfig::default(),
            contact: ContactConfig::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache window as Duration.
    pub fn cache_time(&self) -> Duration {
        Duration::from_millis(self.cache_time_ms)
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_ms.map(Duration::from_millis)
    }

    pub fn status_reset(&self) -> Duration {
        Duration::from_millis(self.contact.status_reset_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `FOLIO_`
    /// 2. TOML file from `FOLIO_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config_file = std::env::var("FOLIO_CONFIG_FILE").ok();
        Self::load_from(config_file.as_deref())
    }

    /// Same as [`AppConfig::load`] but with an explicit TOML path.
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(
            Env::prefixed("FOLIO_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check that the email service credentials are available (deferred
    /// until the contact form is actually submitted).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` naming the first absent credential.
    pub fn require_email_credentials(&self) -> Result<EmailCredentials<'_>, ConfigError> {
        let missing = |field: &str, env: &str| ConfigError::Missing {
            field: format!("contact.{field}"),
            hint: format!("Set FOLIO_CONTACT__{env} environment variable"),
        };

        let service_id = self
            .contact
            .service_id
            .as_deref()
            .ok_or_else(|| missing("service_id", "SERVICE_ID"))?;
        let template_id = self
            .contact
            .template_id
            .as_deref()
            .ok_or_else(|| missing("template_id", "TEMPLATE_ID"))?;
        let public_key = self
            .contact
            .public_key
            .as_deref()
            .ok_or_else(|| missing("public_key", "PUBLIC_KEY"))?;

        Ok(EmailCredentials { service_id, template_id, public_key })
    }
}
