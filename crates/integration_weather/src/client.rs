//! Open-Meteo weather client
//!
//! HTTP client for the hourly endpoint of the Open-Meteo Weather API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use domain::value_objects::{ProxyTemplate, rewrite_url};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::models::{ApiErrorBody, ApiResponse, HourlyData, HourlyForecast, HourlyPoint};

/// Hourly variables requested from the API
const HOURLY_VARIABLES: &str = "precipitation_probability,precipitation";

/// Maximum forecast range supported by Open-Meteo
const MAX_FORECAST_DAYS: u8 = 16;

/// Weather client errors
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Connection to the weather service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the weather service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Request did not complete within the client timeout
    #[error("Request timed out")]
    Timeout,

    /// Failed to parse response from weather service
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid coordinates provided
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl WeatherError {
    /// Whether retrying the same request may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::Timeout
                | Self::ServiceUnavailable(_)
                | Self::RateLimitExceeded
        )
    }

    fn from_send(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::ConnectionFailed(e.to_string())
        } else {
            Self::RequestFailed(e.to_string())
        }
    }
}

/// Weather service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Open-Meteo API base URL (default: <https://api.open-meteo.com/v1>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (default: 15)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional URL-rewriting proxy applied to every request
    #[serde(default)]
    pub proxy_template: Option<ProxyTemplate>,
}

fn default_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

const fn default_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    concat!("dryspot/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            proxy_template: None,
        }
    }
}

/// Weather client trait for fetching hourly forecasts
#[async_trait]
pub trait WeatherClient: Send + Sync {
    /// Get the hourly precipitation forecast for `days` days, starting today
    async fn get_hourly(
        &self,
        latitude: f64,
        longitude: f64,
        days: u8,
    ) -> Result<HourlyForecast, WeatherError>;

    /// Check if the weather service is healthy
    async fn is_healthy(&self) -> bool;
}

/// Open-Meteo HTTP client implementation
#[derive(Debug)]
pub struct OpenMeteoClient {
    client: Client,
    config: WeatherConfig,
}

impl OpenMeteoClient {
    /// Create a new Open-Meteo client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| WeatherError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create a client around an existing `reqwest::Client`
    ///
    /// The caller is responsible for the client's timeout and user agent.
    #[must_use]
    pub const fn with_http_client(client: Client, config: WeatherConfig) -> Self {
        Self { client, config }
    }

    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_defaults() -> Result<Self, WeatherError> {
        Self::new(WeatherConfig::default())
    }

    /// Validate coordinates
    fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), WeatherError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::InvalidCoordinates);
        }
        Ok(())
    }

    /// Build the request URL, routed through the proxy when configured
    fn build_hourly_url(
        &self,
        latitude: f64,
        longitude: f64,
        days: u8,
    ) -> Result<String, WeatherError> {
        let days = days.clamp(1, MAX_FORECAST_DAYS);
        let url = Url::parse_with_params(
            &format!("{}/forecast", self.config.base_url.trim_end_matches('/')),
            &[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("hourly", HOURLY_VARIABLES.to_string()),
                ("forecast_days", days.to_string()),
                ("timezone", "auto".to_string()),
            ],
        )
        .map_err(|e| WeatherError::RequestFailed(format!("Invalid base URL: {e}")))?;

        Ok(rewrite_url(self.config.proxy_template.as_ref(), url.as_str()))
    }

    /// Turn the column-oriented hourly block into one point per hour
    fn parse_hourly(data: HourlyData) -> Result<Vec<HourlyPoint>, WeatherError> {
        let hours = data.time.len();
        if data.precipitation_probability.len() != hours || data.precipitation.len() != hours {
            return Err(WeatherError::ParseError(format!(
                "Hourly arrays differ in length: time={hours}, precipitation_probability={}, precipitation={}",
                data.precipitation_probability.len(),
                data.precipitation.len()
            )));
        }

        Ok(data
            .time
            .iter()
            .zip(data.precipitation_probability)
            .zip(data.precipitation)
            .map(|((time, precipitation_probability), precipitation)| HourlyPoint {
                time: Self::parse_datetime(time),
                precipitation_probability,
                precipitation,
            })
            .collect())
    }

    /// Parse Open-Meteo local time (`2026-02-05T14:00`)
    fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
            .ok()
    }
}

#[async_trait]
impl WeatherClient for OpenMeteoClient {
    #[instrument(skip(self), fields(lat = %latitude, lon = %longitude, days = %days))]
    async fn get_hourly(
        &self,
        latitude: f64,
        longitude: f64,
        days: u8,
    ) -> Result<HourlyForecast, WeatherError> {
        Self::validate_coordinates(latitude, longitude)?;

        let url = self.build_hourly_url(latitude, longitude, days)?;
        debug!(url = %url, "Fetching hourly forecast");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WeatherError::from_send(&e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(WeatherError::RateLimitExceeded);
        }
        if status.is_server_error() {
            return Err(WeatherError::ServiceUnavailable(format!("HTTP {status}")));
        }
        if !status.is_success() {
            let reason = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.reason)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(WeatherError::RequestFailed(reason));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::ParseError(e.to_string()))?;

        let hourly = api_response.hourly.ok_or_else(|| {
            WeatherError::ParseError("No hourly forecast data in response".to_string())
        })?;
        let hours = Self::parse_hourly(hourly)?;
        debug!(hours = hours.len(), "Parsed hourly forecast");

        Ok(HourlyForecast {
            latitude: api_response.latitude,
            longitude: api_response.longitude,
            timezone: api_response.timezone,
            hours,
        })
    }

    async fn is_healthy(&self) -> bool {
        // Simple health check using Berlin coordinates
        self.get_hourly(52.52, 13.41, 1).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use domain::search::ForecastValue;

    use super::*;

    fn client_with(config: WeatherConfig) -> OpenMeteoClient {
        OpenMeteoClient::new(config).expect("client creation should succeed")
    }

    #[test]
    fn test_config_defaults() {
        let config = WeatherConfig::default();
        assert_eq!(config.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.timeout_secs, 15);
        assert!(config.user_agent.starts_with("dryspot/"));
        assert!(config.proxy_template.is_none());
    }

    #[test]
    fn test_validate_coordinates_valid() {
        assert!(OpenMeteoClient::validate_coordinates(0.0, 0.0).is_ok());
        assert!(OpenMeteoClient::validate_coordinates(90.0, 180.0).is_ok());
        assert!(OpenMeteoClient::validate_coordinates(-90.0, -180.0).is_ok());
        assert!(OpenMeteoClient::validate_coordinates(52.52, 13.41).is_ok());
    }

    #[test]
    fn test_validate_coordinates_invalid() {
        assert!(OpenMeteoClient::validate_coordinates(91.0, 0.0).is_err());
        assert!(OpenMeteoClient::validate_coordinates(-91.0, 0.0).is_err());
        assert!(OpenMeteoClient::validate_coordinates(0.0, 181.0).is_err());
        assert!(OpenMeteoClient::validate_coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_build_hourly_url() {
        let client = client_with(WeatherConfig::default());
        let url = client.build_hourly_url(52.52, 13.41, 1).unwrap();
        assert!(url.starts_with("https://api.open-meteo.com/v1/forecast?"));
        assert!(url.contains("latitude=52.52"));
        assert!(url.contains("longitude=13.41"));
        assert!(url.contains("hourly=precipitation_probability%2Cprecipitation"));
        assert!(url.contains("forecast_days=1"));
        assert!(url.contains("timezone=auto"));
    }

    #[test]
    fn test_build_hourly_url_clamps_days() {
        let client = client_with(WeatherConfig::default());
        let url = client.build_hourly_url(0.0, 0.0, 20).unwrap();
        assert!(url.contains("forecast_days=16"));
        let url = client.build_hourly_url(0.0, 0.0, 0).unwrap();
        assert!(url.contains("forecast_days=1"));
    }

    #[test]
    fn test_build_hourly_url_through_proxy() {
        let client = client_with(WeatherConfig {
            proxy_template: Some(
                ProxyTemplate::parse("https://proxy.example/get?u={url}").unwrap(),
            ),
            ..WeatherConfig::default()
        });
        let url = client.build_hourly_url(1.0, 2.0, 1).unwrap();
        assert!(url.starts_with("https://proxy.example/get?u=https%3A%2F%2Fapi.open-meteo.com%2F"));
        assert!(!url.contains("&latitude"));
    }

    #[test]
    fn test_parse_hourly_zips_columns() {
        let data = HourlyData {
            time: vec!["2024-06-01T00:00".to_string(), "garbage".to_string()],
            precipitation_probability: vec![ForecastValue::Number(5.0), ForecastValue::Missing],
            precipitation: vec![ForecastValue::Number(0.0), ForecastValue::from("0.3")],
        };
        let hours = OpenMeteoClient::parse_hourly(data).unwrap();
        assert_eq!(hours.len(), 2);
        assert!(hours[0].time.is_some());
        assert!(hours[1].time.is_none());
        assert!(hours[1].precipitation_probability.is_missing());
    }

    #[test]
    fn test_parse_hourly_rejects_ragged_columns() {
        let data = HourlyData {
            time: vec!["2024-06-01T00:00".to_string(), "2024-06-01T01:00".to_string()],
            precipitation_probability: vec![ForecastValue::Number(5.0)],
            precipitation: vec![ForecastValue::Number(0.0), ForecastValue::Number(0.0)],
        };
        assert!(matches!(
            OpenMeteoClient::parse_hourly(data),
            Err(WeatherError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert!(OpenMeteoClient::parse_datetime("2026-02-05T14:00").is_some());
        assert!(OpenMeteoClient::parse_datetime("2026-02-05T14:00:00").is_some());
        assert!(OpenMeteoClient::parse_datetime("2026-02-05").is_none());
    }

    #[test]
    fn test_weather_error_retryable() {
        assert!(WeatherError::RateLimitExceeded.is_retryable());
        assert!(WeatherError::ServiceUnavailable("HTTP 503".into()).is_retryable());
        assert!(WeatherError::Timeout.is_retryable());
        assert!(!WeatherError::ParseError("x".into()).is_retryable());
        assert!(!WeatherError::InvalidCoordinates.is_retryable());
    }

    #[test]
    fn test_client_creation() {
        assert!(OpenMeteoClient::with_defaults().is_ok());
    }

    #[test]
    fn test_config_deserializes_proxy() {
        let config: WeatherConfig =
            serde_json::from_str(r#"{"proxy_template": "http://127.0.0.1:9000/?{url}"}"#)
                .expect("should deserialize");
        assert!(config.proxy_template.is_some());
        assert_eq!(config.timeout_secs, 15);

        let bad: Result<WeatherConfig, _> =
            serde_json::from_str(r#"{"proxy_template": "http://127.0.0.1:9000/"}"#);
        assert!(bad.is_err());
    }
}
