//! Candidate generation
//!
//! Turns an origin and a radius into the origin itself plus eight points at
//! the compass bearings. Offsets use a flat-earth approximation: one degree
//! of latitude is taken as 111 km, and the longitude step is widened by
//! `1 / cos(latitude)` to account for meridian convergence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{Coordinate, SearchRadius};

/// Kilometres per degree of latitude used for offsets
pub const KM_PER_DEGREE_LATITUDE: f64 = 111.0;

/// Number of candidates produced per query (origin + 8 bearings)
pub const CANDIDATE_COUNT: usize = 1 + CompassBearing::ALL.len();

/// One of the eight compass bearings, clockwise from north
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompassBearing {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CompassBearing {
    /// All bearings in generation order (0°, 45°, …, 315°)
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Bearing in degrees clockwise from north
    #[must_use]
    pub const fn degrees(self) -> f64 {
        match self {
            Self::North => 0.0,
            Self::NorthEast => 45.0,
            Self::East => 90.0,
            Self::SouthEast => 135.0,
            Self::South => 180.0,
            Self::SouthWest => 225.0,
            Self::West => 270.0,
            Self::NorthWest => 315.0,
        }
    }

    /// Short label ("N", "NE", …)
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::NorthEast => "NE",
            Self::East => "E",
            Self::SouthEast => "SE",
            Self::South => "S",
            Self::SouthWest => "SW",
            Self::West => "W",
            Self::NorthWest => "NW",
        }
    }
}

impl fmt::Display for CompassBearing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Where a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "bearing", rename_all = "snake_case")]
pub enum CandidateKind {
    /// The resolved origin itself
    Origin,
    /// Offset from the origin by the search radius along a bearing
    Offset(CompassBearing),
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Origin => f.write_str("origin"),
            Self::Offset(bearing) => write!(f, "{bearing}"),
        }
    }
}

/// A sampled coordinate to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidatePoint {
    pub kind: CandidateKind,
    pub coordinate: Coordinate,
}

impl CandidatePoint {
    #[must_use]
    pub const fn origin(coordinate: Coordinate) -> Self {
        Self {
            kind: CandidateKind::Origin,
            coordinate,
        }
    }

    #[must_use]
    pub const fn is_origin(&self) -> bool {
        matches!(self.kind, CandidateKind::Origin)
    }
}

impl fmt::Display for CandidatePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.coordinate)
    }
}

/// Wrap a longitude into [-180, 180]
fn normalize_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        return longitude;
    }
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && longitude > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Generate the origin followed by the eight compass offsets
///
/// # Errors
///
/// Returns `DomainError::PolarOrigin` when the origin lies on a pole, where
/// `cos(latitude)` is zero and the longitude step is undefined.
pub fn generate_candidates(
    origin: Coordinate,
    radius: SearchRadius,
) -> Result<Vec<CandidatePoint>, DomainError> {
    if origin.is_polar() {
        return Err(DomainError::PolarOrigin {
            latitude: origin.latitude(),
        });
    }

    let lat_delta = radius.km() / KM_PER_DEGREE_LATITUDE;
    let lon_delta = lat_delta / origin.latitude().to_radians().cos();
    if !lon_delta.is_finite() {
        return Err(DomainError::PolarOrigin {
            latitude: origin.latitude(),
        });
    }

    let mut candidates = Vec::with_capacity(CANDIDATE_COUNT);
    candidates.push(CandidatePoint::origin(origin));

    for bearing in CompassBearing::ALL {
        let theta = bearing.degrees().to_radians();
        let latitude = lat_delta.mul_add(theta.cos(), origin.latitude());
        let longitude = normalize_longitude(lon_delta.mul_add(theta.sin(), origin.longitude()));

        candidates.push(CandidatePoint {
            kind: CandidateKind::Offset(bearing),
            coordinate: Coordinate::new_unchecked(latitude, longitude),
        });
    }

    Ok(candidates)
}
