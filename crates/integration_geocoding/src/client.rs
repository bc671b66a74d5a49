//! Nominatim geocoding client
//!
//! Converts free-form place names to coordinates and back using the
//! [Nominatim](https://nominatim.openstreetmap.org) API (OpenStreetMap).
//!
//! Requests are spaced per the Nominatim usage policy (max 1 request/second)
//! and forward lookups are cached to minimize API calls.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::value_objects::{Coordinate, rewrite_url};
use moka::future::Cache;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::config::NominatimConfig;
use crate::error::GeocodingError;
use crate::models::{ReverseResult, SearchResult};

/// Trait for geocoding clients
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Convert a free-form place name to geographic coordinates
    ///
    /// Returns `GeocodingError::NotFound` when the service has no match.
    async fn geocode(&self, place: &str) -> Result<Coordinate, GeocodingError>;

    /// Convert coordinates to a human-readable label
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<String, GeocodingError>;
}

/// Nominatim-based geocoding client with rate limiting and caching
#[derive(Debug)]
pub struct NominatimGeocodingClient {
    client: Client,
    config: NominatimConfig,
    cache: Option<Cache<String, Coordinate>>,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl NominatimGeocodingClient {
    /// Create a new Nominatim geocoding client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &NominatimConfig) -> Result<Self, GeocodingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| GeocodingError::Configuration(e.to_string()))?;

        Ok(Self::with_http_client(client, config))
    }

    /// Create a client around an existing `reqwest::Client`
    ///
    /// The caller is responsible for the client's timeout and user agent.
    #[must_use]
    pub fn with_http_client(client: Client, config: &NominatimConfig) -> Self {
        let cache = (config.cache_ttl_hours > 0).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(Duration::from_secs(config.cache_ttl_hours * 3600))
                .build()
        });

        Self {
            client,
            config: config.clone(),
            cache,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Space requests at least `min_interval_ms` apart
    ///
    /// The lock is held while waiting, so concurrent callers queue up.
    async fn rate_limit(&self) {
        let min_interval = Duration::from_millis(self.config.min_interval_ms);
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < min_interval {
                let wait = min_interval.saturating_sub(elapsed);
                debug!(?wait, "Rate limiting geocoding request");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String, GeocodingError> {
        let url = Url::parse_with_params(
            &format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/')),
            params,
        )
        .map_err(|e| GeocodingError::Configuration(format!("Invalid base URL: {e}")))?;

        Ok(rewrite_url(self.config.proxy_template.as_ref(), url.as_str()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GeocodingError> {
        self.rate_limit().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GeocodingError::from_send(&e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodingError::RateLimitExceeded);
        }
        if !status.is_success() {
            return Err(GeocodingError::RequestFailed(format!("HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| GeocodingError::ParseError(e.to_string()))
    }

    fn parse_coordinate(result: &SearchResult) -> Result<Coordinate, GeocodingError> {
        let lat: f64 = result
            .lat
            .trim()
            .parse()
            .map_err(|_| GeocodingError::ParseError(format!("Invalid latitude '{}'", result.lat)))?;
        let lon: f64 = result
            .lon
            .trim()
            .parse()
            .map_err(|_| GeocodingError::ParseError(format!("Invalid longitude '{}'", result.lon)))?;

        Coordinate::new(lat, lon).map_err(|e| GeocodingError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl GeocodingClient for NominatimGeocodingClient {
    #[instrument(skip(self))]
    async fn geocode(&self, place: &str) -> Result<Coordinate, GeocodingError> {
        let place = place.trim();
        if place.is_empty() {
            return Err(GeocodingError::NotFound(
                "Place name must not be empty".to_string(),
            ));
        }

        let cache_key = place.to_lowercase();
        if let Some(cache) = &self.cache {
            if let Some(coordinate) = cache.get(&cache_key).await {
                debug!(%place, "Geocoding cache hit");
                return Ok(coordinate);
            }
        }

        let mut params = vec![
            ("q", place.to_string()),
            ("format", "jsonv2".to_string()),
            ("limit", "1".to_string()),
            ("accept-language", self.config.accept_language.clone()),
        ];
        if !self.config.country_filter.is_empty() {
            params.push(("countrycodes", self.config.country_filter.clone()));
        }
        let url = self.build_url("search", &params)?;

        debug!(%place, "Geocoding place");
        let results: Vec<SearchResult> = self.get_json(&url).await?;

        let result = results
            .first()
            .ok_or_else(|| GeocodingError::NotFound(place.to_string()))?;
        let coordinate = Self::parse_coordinate(result)?;

        if let Some(cache) = &self.cache {
            cache.insert(cache_key, coordinate).await;
        }
        debug!(
            %place,
            lat = coordinate.latitude(),
            lon = coordinate.longitude(),
            label = result.display_name.as_deref().unwrap_or_default(),
            "Geocoded place"
        );

        Ok(coordinate)
    }

    #[instrument(skip(self))]
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<String, GeocodingError> {
        if Coordinate::new(latitude, longitude).is_err() {
            return Err(GeocodingError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }

        let params = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("format", "jsonv2".to_string()),
            ("zoom", "14".to_string()),
            ("accept-language", self.config.accept_language.clone()),
        ];
        let url = self.build_url("reverse", &params)?;

        debug!(%latitude, %longitude, "Reverse geocoding");
        let result: ReverseResult = self.get_json(&url).await?;

        if let Some(error) = &result.error {
            debug!(%error, "Reverse geocoding found nothing");
        }
        result
            .label()
            .ok_or_else(|| GeocodingError::NotFound(format!("{latitude},{longitude}")))
    }
}
