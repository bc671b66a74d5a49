//! Geographic coordinate value object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// A geographic coordinate with latitude and longitude in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    latitude: f64,
    /// Longitude in degrees (-180 to 180)
    longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate with validation
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinates` if latitude is not in [-90, 90]
    /// or longitude is not in [-180, 180]. NaN is never in range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !Self::in_range(latitude, longitude) {
            return Err(DomainError::InvalidCoordinates);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a coordinate without validation
    ///
    /// Used for computed candidate offsets, which may leave the valid range
    /// near the poles. Check with [`Coordinate::is_valid`] before sending one
    /// to an external service.
    #[must_use]
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn in_range(latitude: f64, longitude: f64) -> bool {
        (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
    }

    /// Whether both components are inside the valid range
    #[must_use]
    pub fn is_valid(&self) -> bool {
        Self::in_range(self.latitude, self.longitude)
    }

    /// Get the latitude
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Get the longitude
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Whether this coordinate lies exactly on the north or south pole
    #[must_use]
    pub fn is_polar(&self) -> bool {
        self.latitude.abs() >= 90.0
    }

    /// Calculate approximate distance to another coordinate in kilometers
    ///
    /// Uses the Haversine formula for great-circle distance
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let lat1_rad = self.latitude.to_radians();
        let lat2_rad = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (lat1_rad.cos() * lat2_rad.cos()).mul_add(
            (delta_lon / 2.0).sin().powi(2),
            (delta_lat / 2.0).sin().powi(2),
        );
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Common locations for tests and defaults
impl Coordinate {
    /// Berlin, Germany
    #[must_use]
    pub const fn berlin() -> Self {
        Self::new_unchecked(52.52, 13.405)
    }

    /// London, UK
    #[must_use]
    pub const fn london() -> Self {
        Self::new_unchecked(51.5074, -0.1278)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        let coord = Coordinate::new(52.52, 13.405).expect("valid coordinates");
        assert!((coord.latitude() - 52.52).abs() < f64::EPSILON);
        assert!((coord.longitude() - 13.405).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boundary_coordinates() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_invalid_latitude() {
        assert_eq!(
            Coordinate::new(91.0, 0.0),
            Err(DomainError::InvalidCoordinates)
        );
        assert!(Coordinate::new(-91.0, 0.0).is_err());
    }

    #[test]
    fn test_invalid_longitude() {
        assert!(Coordinate::new(0.0, 181.0).is_err());
        assert!(Coordinate::new(0.0, -181.0).is_err());
    }

    #[test]
    fn test_nan_rejected() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::NAN).is_err());
        assert!(!Coordinate::new_unchecked(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_unchecked_out_of_range_is_invalid() {
        let coord = Coordinate::new_unchecked(90.05, 10.0);
        assert!(!coord.is_valid());
        assert!(Coordinate::berlin().is_valid());
    }

    #[test]
    fn test_is_polar() {
        assert!(Coordinate::new_unchecked(90.0, 0.0).is_polar());
        assert!(Coordinate::new_unchecked(-90.0, 0.0).is_polar());
        assert!(!Coordinate::new_unchecked(89.999, 0.0).is_polar());
    }

    #[test]
    fn test_display() {
        let coord = Coordinate::new(52.52, 13.405).expect("valid");
        assert_eq!(format!("{coord}"), "52.520000, 13.405000");
    }

    #[test]
    fn test_distance_same_location() {
        let coord = Coordinate::berlin();
        assert!(coord.distance_km(&coord).abs() < 0.001);
    }

    #[test]
    fn test_distance_berlin_london() {
        let distance = Coordinate::berlin().distance_km(&Coordinate::london());
        // Berlin to London is approximately 930km
        assert!((distance - 930.0).abs() < 50.0);
    }

    #[test]
    fn test_serialization() {
        let coord = Coordinate::new(52.52, 13.405).expect("valid");
        let json = serde_json::to_string(&coord).expect("serialize");
        assert_eq!(json, r#"{"latitude":52.52,"longitude":13.405}"#);

        let deserialized: Coordinate = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(coord, deserialized);
    }
}
