//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Search radius is not a finite, positive number of kilometres
    #[error("Invalid radius: {0} km (must be a finite number greater than 0)")]
    InvalidRadius(f64),

    /// Place name is empty or whitespace only
    #[error("Invalid place name: must not be empty")]
    InvalidPlaceName,

    /// Coordinates outside the valid latitude/longitude range
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    /// Origin sits on a pole where the longitude offset is undefined
    #[error("Origin latitude {latitude} is at a pole; longitude offsets are undefined")]
    PolarOrigin { latitude: f64 },

    /// Evaluation window must cover at least one hour
    #[error("Invalid evaluation window: {0} hours (must be at least 1)")]
    InvalidWindow(usize),

    /// Proxy URL template is malformed
    #[error("Invalid proxy template: {0}")]
    InvalidProxyTemplate(String),
}

impl DomainError {
    /// Returns true if this error was caused by user input
    #[must_use]
    pub const fn is_user_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidRadius(_)
                | Self::InvalidPlaceName
                | Self::InvalidCoordinates
                | Self::PolarOrigin { .. }
        )
    }
}
