//! Search tuning: radius, timeouts, concurrency and the scored window

use application::services::SiteSearchConfig;
use serde::{Deserialize, Serialize};

/// Longest window the forecast source can serve (16 days)
pub const MAX_WINDOW_HOURS: usize = 16 * 24;

/// `[search]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchAppConfig {
    /// Radius used when the CLI gets no `--radius` (default: 10 km)
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,

    /// Timeout for each external call in seconds (default: 15)
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Maximum concurrent forecast fetches (default: 4)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Leading forecast hours that are scored (default: 24)
    #[serde(default = "default_window_hours")]
    pub window_hours: usize,
}

const fn default_radius_km() -> f64 {
    10.0
}

fn default_fetch_timeout_secs() -> u64 {
    SiteSearchConfig::default().fetch_timeout_secs
}

fn default_max_concurrency() -> usize {
    SiteSearchConfig::default().max_concurrency
}

fn default_window_hours() -> usize {
    SiteSearchConfig::default().window_hours
}

impl Default for SearchAppConfig {
    fn default() -> Self {
        Self {
            default_radius_km: default_radius_km(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_concurrency: default_max_concurrency(),
            window_hours: default_window_hours(),
        }
    }
}

impl SearchAppConfig {
    /// Settings for the search service
    #[must_use]
    pub const fn to_service_config(&self) -> SiteSearchConfig {
        SiteSearchConfig {
            fetch_timeout_secs: self.fetch_timeout_secs,
            max_concurrency: self.max_concurrency,
            window_hours: self.window_hours,
        }
    }
}
