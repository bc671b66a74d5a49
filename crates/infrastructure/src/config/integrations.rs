//! Integration configurations: Geocoding, Forecast, shared HTTP settings.

use domain::value_objects::ProxyTemplate;
use integration_geocoding::NominatimConfig;
use integration_weather::WeatherConfig;
use serde::{Deserialize, Serialize};

// ==============================
// Geocoding Configuration
// ==============================

/// `[geocoding]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodingAppConfig {
    /// Nominatim base URL
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_secs: u64,

    /// Cache TTL in hours (0 disables the cache)
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,

    /// ISO country codes limiting the search, comma separated (empty for worldwide)
    #[serde(default)]
    pub country_filter: String,

    /// User agent sent to Nominatim
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_geocoding_base_url() -> String {
    NominatimConfig::default().base_url
}

const fn default_geocoding_timeout() -> u64 {
    10
}

const fn default_cache_ttl_hours() -> u64 {
    24
}

fn default_user_agent() -> String {
    concat!("dryspot/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for GeocodingAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            timeout_secs: default_geocoding_timeout(),
            cache_ttl_hours: default_cache_ttl_hours(),
            country_filter: String::new(),
            user_agent: default_user_agent(),
        }
    }
}

impl GeocodingAppConfig {
    /// Client configuration, routed through `proxy` when set
    #[must_use]
    pub fn to_client_config(&self, proxy: Option<&ProxyTemplate>) -> NominatimConfig {
        NominatimConfig {
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
            cache_ttl_hours: self.cache_ttl_hours,
            country_filter: self.country_filter.clone(),
            user_agent: self.user_agent.clone(),
            proxy_template: proxy.cloned(),
            ..NominatimConfig::default()
        }
    }
}

// ==============================
// Forecast Configuration
// ==============================

/// `[forecast]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastAppConfig {
    /// Open-Meteo API base URL
    #[serde(default = "default_forecast_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_forecast_timeout")]
    pub timeout_secs: u64,

    /// Label the winning site with the nearest named place
    #[serde(default)]
    pub resolve_labels: bool,
}

fn default_forecast_base_url() -> String {
    WeatherConfig::default().base_url
}

const fn default_forecast_timeout() -> u64 {
    15
}

impl Default for ForecastAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_forecast_base_url(),
            timeout_secs: default_forecast_timeout(),
            resolve_labels: false,
        }
    }
}

impl ForecastAppConfig {
    /// Client configuration, routed through `proxy` when set
    #[must_use]
    pub fn to_client_config(&self, proxy: Option<&ProxyTemplate>) -> WeatherConfig {
        WeatherConfig {
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
            proxy_template: proxy.cloned(),
            ..WeatherConfig::default()
        }
    }
}

// ==============================
// HTTP Configuration
// ==============================

/// `[http]` section, shared by every outgoing request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpAppConfig {
    /// URL-rewriting proxy, e.g. `https://proxy.example/?url={url}`
    #[serde(default)]
    pub proxy_template: Option<ProxyTemplate>,
}
