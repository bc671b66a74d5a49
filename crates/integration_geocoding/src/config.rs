//! Nominatim client configuration

use domain::value_objects::ProxyTemplate;
use serde::{Deserialize, Serialize};

/// Configuration for the Nominatim geocoding service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominatimConfig {
    /// Base URL for the Nominatim API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Cache TTL in hours (0 disables the cache)
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,

    /// Comma-separated ISO country codes limiting the search (empty for worldwide)
    #[serde(default)]
    pub country_filter: String,

    /// Preferred language for returned labels
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// User agent; Nominatim rejects requests without an identifying one
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Minimum spacing between two requests in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Optional URL-rewriting proxy applied to every request
    #[serde(default)]
    pub proxy_template: Option<ProxyTemplate>,
}

fn default_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_cache_ttl_hours() -> u64 {
    24
}

fn default_accept_language() -> String {
    "en".to_string()
}

fn default_user_agent() -> String {
    concat!("dryspot/", env!("CARGO_PKG_VERSION")).to_string()
}

const fn default_min_interval_ms() -> u64 {
    1100
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            cache_ttl_hours: default_cache_ttl_hours(),
            country_filter: String::new(),
            accept_language: default_accept_language(),
            user_agent: default_user_agent(),
            min_interval_ms: default_min_interval_ms(),
            proxy_template: None,
        }
    }
}

impl NominatimConfig {
    /// Create a configuration suitable for testing
    ///
    /// Caching and rate limiting are off so every call reaches the server.
    #[must_use]
    pub fn for_testing(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 5,
            cache_ttl_hours: 0,
            min_interval_ms: 0,
            ..Default::default()
        }
    }
}
