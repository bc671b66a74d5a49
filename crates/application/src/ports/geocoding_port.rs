//! Geocoding service port
//!
//! Resolves free-text place names to coordinates and, optionally, a
//! coordinate back to a human-readable label.

use async_trait::async_trait;
use domain::value_objects::Coordinate;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for place-name resolution
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GeocodingPort: Send + Sync {
    /// Resolve a place name to the coordinate of its best match
    ///
    /// Returns `Ok(None)` when the service knows no such place.
    async fn resolve(&self, place: &str) -> Result<Option<Coordinate>, ApplicationError>;

    /// Nearest named place for a coordinate, if any
    async fn label_for(&self, coordinate: &Coordinate)
    -> Result<Option<String>, ApplicationError>;

    /// Check if the geocoding service is reachable
    async fn is_available(&self) -> bool;
}
