//! Health aggregation service
//!
//! Checks reachability of the geocoding and forecast services with a
//! timeout per service.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::ports::{ForecastPort, GeocodingPort};

/// Default timeout for each health check in seconds
const DEFAULT_HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Configuration for health check behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Timeout for each service check in seconds (default: 5)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

const fn default_timeout() -> u64 {
    DEFAULT_HEALTH_CHECK_TIMEOUT_SECS
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

/// Status of an individual service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    #[must_use]
    pub const fn healthy() -> Self {
        Self {
            healthy: true,
            response_time_ms: None,
            error: None,
        }
    }

    #[must_use]
    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            healthy: false,
            response_time_ms: None,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn timeout() -> Self {
        Self::unhealthy("Health check timed out")
    }

    #[must_use]
    pub const fn with_response_time(mut self, ms: u64) -> Self {
        self.response_time_ms = Some(ms);
        self
    }
}

/// Health report for all services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// True if every service is healthy
    pub healthy: bool,
    pub services: BTreeMap<String, ServiceHealth>,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    #[must_use]
    pub fn new(services: BTreeMap<String, ServiceHealth>) -> Self {
        let healthy = services.values().all(|s| s.healthy);
        Self {
            healthy,
            services,
            checked_at: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn service_status(&self, name: &str) -> Option<&ServiceHealth> {
        self.services.get(name)
    }
}

/// Service for checking the external collaborators
pub struct HealthService {
    config: HealthConfig,
    geocoder: Arc<dyn GeocodingPort>,
    forecast: Arc<dyn ForecastPort>,
}

impl std::fmt::Debug for HealthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthService")
            .field("config", &self.config)
            .field("geocoder", &"<GeocodingPort>")
            .field("forecast", &"<ForecastPort>")
            .finish()
    }
}

impl HealthService {
    #[must_use]
    pub fn new(geocoder: Arc<dyn GeocodingPort>, forecast: Arc<dyn ForecastPort>) -> Self {
        Self {
            config: HealthConfig::default(),
            geocoder,
            forecast,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: HealthConfig) -> Self {
        self.config = config;
        self
    }

    /// Check every service
    #[instrument(skip(self))]
    pub async fn check_all(&self) -> HealthReport {
        let (geocoding, forecast) = tokio::join!(self.check_geocoding(), self.check_forecast());

        let mut services = BTreeMap::new();
        services.insert("geocoding".to_string(), geocoding);
        services.insert("forecast".to_string(), forecast);
        HealthReport::new(services)
    }

    pub async fn check_geocoding(&self) -> ServiceHealth {
        self.check("geocoding", self.geocoder.is_available()).await
    }

    pub async fn check_forecast(&self) -> ServiceHealth {
        self.check("forecast", self.forecast.is_available()).await
    }

    async fn check(&self, service: &str, probe: impl Future<Output = bool>) -> ServiceHealth {
        let start = Instant::now();
        let Ok(available) = timeout(Duration::from_secs(self.config.timeout_secs), probe).await
        else {
            warn!(service, "Health check timed out");
            return ServiceHealth::timeout();
        };

        // Bounded by the check timeout
        #[allow(clippy::cast_possible_truncation)]
        let response_time = start.elapsed().as_millis() as u64;
        if available {
            debug!(service, response_time_ms = response_time, "Service healthy");
            ServiceHealth::healthy().with_response_time(response_time)
        } else {
            warn!(service, response_time_ms = response_time, "Service unhealthy");
            ServiceHealth::unhealthy(format!("{service} service unavailable"))
                .with_response_time(response_time)
        }
    }
}
