//! Search radius value object
//!
//! Represents the distance in kilometres between the origin and each of the
//! compass-offset candidates.
//!
//! # Examples
//!
//! ```
//! use domain::value_objects::SearchRadius;
//!
//! let radius = SearchRadius::new(10.0).expect("valid radius");
//! assert!((radius.km() - 10.0).abs() < f64::EPSILON);
//!
//! // Zero, negative and non-finite radii are rejected
//! assert!(SearchRadius::new(0.0).is_err());
//! assert!(SearchRadius::new(-5.0).is_err());
//! assert!(SearchRadius::new(f64::INFINITY).is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// A validated search radius in kilometres (finite, > 0)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct SearchRadius(f64);

impl SearchRadius {
    /// Create a new validated radius
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRadius` if the value is not finite or not
    /// strictly positive.
    pub fn new(km: f64) -> Result<Self, DomainError> {
        if !km.is_finite() || km <= 0.0 {
            return Err(DomainError::InvalidRadius(km));
        }
        Ok(Self(km))
    }

    /// Parse a radius from user input such as `"10"` or `" 2.5 "`
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRadius` if the text is not numeric or the
    /// number is not a valid radius.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let km = input
            .trim()
            .parse::<f64>()
            .map_err(|_| DomainError::InvalidRadius(f64::NAN))?;
        Self::new(km)
    }

    /// Radius in kilometres
    #[must_use]
    pub const fn km(self) -> f64 {
        self.0
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self(10.0)
    }
}

impl fmt::Display for SearchRadius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} km", self.0)
    }
}

impl TryFrom<f64> for SearchRadius {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Custom deserialization that validates the radius
impl<'de> Deserialize<'de> for SearchRadius {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}
