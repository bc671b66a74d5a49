//! Weather data models
//!
//! Types for the hourly precipitation data returned by the Open-Meteo API.

use chrono::NaiveDateTime;
use domain::search::ForecastValue;
use serde::{Deserialize, Serialize};

/// One forecast hour as reported by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    /// Local time of the hour (timezone of the location)
    pub time: Option<NaiveDateTime>,
    /// Probability of precipitation in percent
    pub precipitation_probability: ForecastValue,
    /// Expected precipitation in mm
    pub precipitation: ForecastValue,
}

/// Hourly forecast for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Latitude of the grid cell the API answered for
    pub latitude: f64,
    /// Longitude of the grid cell the API answered for
    pub longitude: f64,
    /// Timezone name (e.g. "Europe/Berlin")
    pub timezone: Option<String>,
    /// Hours in chronological order
    pub hours: Vec<HourlyPoint>,
}

// ============================================================================
// Raw API response types
// ============================================================================

/// Open-Meteo response envelope
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub hourly: Option<HourlyData>,
}

/// Column-oriented hourly block
///
/// Each field must be a JSON array; anything else fails deserialization.
#[derive(Debug, Deserialize)]
pub(crate) struct HourlyData {
    pub time: Vec<String>,
    pub precipitation_probability: Vec<ForecastValue>,
    pub precipitation: Vec<ForecastValue>,
}

/// Error payload returned with HTTP 400
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub reason: Option<String>,
}
