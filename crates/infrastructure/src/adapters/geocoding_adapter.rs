//! Geocoding adapter - Implements GeocodingPort using integration_geocoding

use application::error::ApplicationError;
use application::ports::GeocodingPort;
use async_trait::async_trait;
use domain::DomainError;
use domain::value_objects::Coordinate;
use integration_geocoding::{
    GeocodingClient, GeocodingError, NominatimConfig, NominatimGeocodingClient,
};
use tracing::{debug, instrument};

use crate::retry::{RetryConfig, retry};

/// Place name used to probe the service in health checks
const HEALTH_PROBE_PLACE: &str = "Berlin";

/// Adapter for place lookups against Nominatim
pub struct GeocodingAdapter {
    client: NominatimGeocodingClient,
    retry: RetryConfig,
}

impl std::fmt::Debug for GeocodingAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingAdapter")
            .field("client", &"NominatimGeocodingClient")
            .field("retry", &self.retry)
            .finish()
    }
}

impl GeocodingAdapter {
    /// Create an adapter with the given client configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: &NominatimConfig) -> Result<Self, ApplicationError> {
        let client = NominatimGeocodingClient::new(config)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    /// Wrap an existing client
    #[must_use]
    pub fn with_client(client: NominatimGeocodingClient) -> Self {
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

    /// Map integration geocoding error to application error
    ///
    /// `NotFound` is handled by the callers and never reaches this.
    fn map_error(err: GeocodingError) -> ApplicationError {
        match err {
            GeocodingError::ConnectionFailed(e)
            | GeocodingError::RequestFailed(e)
            | GeocodingError::NotFound(e) => ApplicationError::ExternalService(e),
            GeocodingError::ParseError(e) => ApplicationError::IncompleteData(e),
            GeocodingError::RateLimitExceeded => ApplicationError::RateLimited,
            GeocodingError::Timeout => ApplicationError::Timeout("geocoding request".into()),
            GeocodingError::InvalidCoordinates { .. } => DomainError::InvalidCoordinates.into(),
            GeocodingError::Configuration(e) => ApplicationError::Configuration(e),
        }
    }

    /// `NotFound` becomes `Ok(None)`, other errors are mapped
    fn found<T>(result: Result<T, GeocodingError>) -> Result<Option<T>, ApplicationError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(GeocodingError::NotFound(what)) => {
                debug!(%what, "No geocoding match");
                Ok(None)
            },
            Err(e) => Err(Self::map_error(e)),
        }
    }
}

#[async_trait]
impl GeocodingPort for GeocodingAdapter {
    #[instrument(skip(self))]
    async fn resolve(&self, place: &str) -> Result<Option<Coordinate>, ApplicationError> {
        let result = retry(&self.retry, "geocode", || self.client.geocode(place)).await;
        Self::found(result)
    }

    #[instrument(skip(self), fields(lat = coordinate.latitude(), lon = coordinate.longitude()))]
    async fn label_for(
        &self,
        coordinate: &Coordinate,
    ) -> Result<Option<String>, ApplicationError> {
        let (lat, lon) = (coordinate.latitude(), coordinate.longitude());
        let result = retry(&self.retry, "reverse_geocode", || {
            self.client.reverse_geocode(lat, lon)
        })
        .await;
        Self::found(result)
    }

    async fn is_available(&self) -> bool {
        self.client.geocode(HEALTH_PROBE_PLACE).await.is_ok()
    }
}
