//! Forecast adapter - Implements ForecastPort using integration_weather

use application::error::ApplicationError;
use application::ports::ForecastPort;
use async_trait::async_trait;
use domain::DomainError;
use domain::search::{EvaluationWindow, ForecastSample, HourlyRecord};
use domain::value_objects::Coordinate;
use integration_weather::{
    HourlyForecast, HourlyPoint, OpenMeteoClient, WeatherClient, WeatherConfig, WeatherError,
};
use tracing::{debug, instrument};

use crate::retry::{RetryConfig, retry};

/// Adapter for hourly forecasts from the Open-Meteo API
pub struct ForecastAdapter {
    client: OpenMeteoClient,
    retry: RetryConfig,
}

impl std::fmt::Debug for ForecastAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastAdapter")
            .field("client", &"OpenMeteoClient")
            .field("retry", &self.retry)
            .finish()
    }
}

impl ForecastAdapter {
    /// Create an adapter with the given client configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: WeatherConfig) -> Result<Self, ApplicationError> {
        let client = OpenMeteoClient::new(config)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    /// Wrap an existing client
    #[must_use]
    pub fn with_client(client: OpenMeteoClient) -> Self {
        Self {
            client,
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Map integration weather error to application error
    fn map_error(err: WeatherError) -> ApplicationError {
        match err {
            WeatherError::ConnectionFailed(e)
            | WeatherError::RequestFailed(e)
            | WeatherError::ServiceUnavailable(e) => ApplicationError::ExternalService(e),
            WeatherError::ParseError(e) => ApplicationError::IncompleteData(e),
            WeatherError::Timeout => ApplicationError::Timeout("forecast request".into()),
            WeatherError::InvalidCoordinates => DomainError::InvalidCoordinates.into(),
            WeatherError::RateLimitExceeded => ApplicationError::RateLimited,
        }
    }

    /// Dryness chance is the complement of the precipitation probability
    fn map_hour(point: HourlyPoint) -> HourlyRecord {
        HourlyRecord {
            time: point.time,
            dryness_chance: point.precipitation_probability.map_coerced(|p| 100.0 - p),
            precipitation_mm: point.precipitation,
        }
    }

    fn map_forecast(forecast: HourlyForecast) -> ForecastSample {
        ForecastSample::new(forecast.hours.into_iter().map(Self::map_hour).collect())
    }
}

#[async_trait]
impl ForecastPort for ForecastAdapter {
    #[instrument(skip(self), fields(lat = coordinate.latitude(), lon = coordinate.longitude(), hours = window.hours()))]
    async fn fetch(
        &self,
        coordinate: &Coordinate,
        window: EvaluationWindow,
    ) -> Result<ForecastSample, ApplicationError> {
        let days = u8::try_from(window.forecast_days()).unwrap_or(u8::MAX);
        let (lat, lon) = (coordinate.latitude(), coordinate.longitude());

        let forecast = retry(&self.retry, "forecast", || self.client.get_hourly(lat, lon, days))
            .await
            .map_err(Self::map_error)?;

        debug!(hours = forecast.hours.len(), "Retrieved hourly forecast");
        Ok(Self::map_forecast(forecast))
    }

    async fn is_available(&self) -> bool {
        self.client.is_healthy().await
    }
}
