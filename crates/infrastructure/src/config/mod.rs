//! Application configuration
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. A TOML file (`dryspot.toml` in the working directory, or an explicit path)
//! 3. Environment variables prefixed `DRYSPOT_`, with `__` between nesting
//!    levels (e.g. `DRYSPOT_SEARCH__MAX_CONCURRENCY=2`)

mod integrations;
mod search;

use std::collections::HashMap;
use std::path::Path;

use application::error::ApplicationError;
use application::services::{HealthConfig, SiteSearchConfig};
use domain::value_objects::SearchRadius;
use integration_geocoding::NominatimConfig;
use integration_weather::WeatherConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use integrations::{ForecastAppConfig, GeocodingAppConfig, HttpAppConfig};
pub use search::{MAX_WINDOW_HOURS, SearchAppConfig};

use crate::retry::RetryConfig;
use crate::telemetry::{LoggingConfig, parse_filter};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "DRYSPOT";

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "dryspot";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub search: SearchAppConfig,

    #[serde(default)]
    pub geocoding: GeocodingAppConfig,

    #[serde(default)]
    pub forecast: ForecastAppConfig,

    /// Backoff for retryable HTTP failures
    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub http: HttpAppConfig,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from defaults, file and process environment
    ///
    /// With `path`, the file must exist; without it, `dryspot.toml` is used
    /// when present.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`AppConfig::load`], reading variables from `env` instead of the
    /// process environment when given
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or parsed.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            // Override with environment variables (e.g., DRYSPOT_SEARCH__WINDOW_HOURS)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        debug!(path = ?path, "Configuration loaded");
        Ok(config)
    }

    /// Check every section for values the services cannot work with
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` naming every invalid key.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let mut problems = Vec::new();

        if let Err(e) = SearchRadius::new(self.search.default_radius_km) {
            problems.push(format!("search.default_radius_km: {e}"));
        }
        if self.search.fetch_timeout_secs == 0 {
            problems.push("search.fetch_timeout_secs must be greater than 0".to_string());
        }
        if self.search.max_concurrency == 0 {
            problems.push("search.max_concurrency must be at least 1".to_string());
        }
        if !(1..=MAX_WINDOW_HOURS).contains(&self.search.window_hours) {
            problems.push(format!(
                "search.window_hours must be between 1 and {MAX_WINDOW_HOURS}, got {}",
                self.search.window_hours
            ));
        }

        for (key, value) in [
            ("geocoding.base_url", &self.geocoding.base_url),
            ("forecast.base_url", &self.forecast.base_url),
        ] {
            if let Err(e) = url::Url::parse(value) {
                problems.push(format!("{key}: invalid URL '{value}': {e}"));
            }
        }
        if self.geocoding.timeout_secs == 0 {
            problems.push("geocoding.timeout_secs must be greater than 0".to_string());
        }
        if self.geocoding.user_agent.trim().is_empty() {
            problems.push("geocoding.user_agent must not be empty".to_string());
        }
        if self.forecast.timeout_secs == 0 {
            problems.push("forecast.timeout_secs must be greater than 0".to_string());
        }
        if self.health.timeout_secs == 0 {
            problems.push("health.timeout_secs must be greater than 0".to_string());
        }

        if let Err(e) = self.retry.validate() {
            problems.push(format!("retry.{e}"));
        }
        if let Err(e) = parse_filter(&self.logging.filter) {
            problems.push(format!("logging.filter: {e}"));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ApplicationError::Configuration(problems.join("; ")))
        }
    }

    /// Radius used when none is given on the command line
    ///
    /// # Errors
    ///
    /// Returns an error if the configured radius is not positive.
    pub fn default_radius(&self) -> Result<SearchRadius, ApplicationError> {
        Ok(SearchRadius::new(self.search.default_radius_km)?)
    }

    #[must_use]
    pub const fn site_search_config(&self) -> SiteSearchConfig {
        self.search.to_service_config()
    }

    #[must_use]
    pub fn nominatim_config(&self) -> NominatimConfig {
        self.geocoding
            .to_client_config(self.http.proxy_template.as_ref())
    }

    #[must_use]
    pub fn weather_config(&self) -> WeatherConfig {
        self.forecast
            .to_client_config(self.http.proxy_template.as_ref())
    }
}
