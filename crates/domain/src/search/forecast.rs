//! Forecast data as delivered by a weather source
//!
//! Sources are loosely typed: a value may arrive as a JSON number, as a
//! numeric string, or not at all. [`ForecastValue`] keeps the raw shape so
//! the evaluator can report exactly what it could not use.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single forecast scalar before coercion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum ForecastValue {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl ForecastValue {
    /// Coerce to a finite number
    ///
    /// Text is trimmed and parsed; anything that does not yield a finite
    /// value gives `None`.
    #[must_use]
    pub fn coerce(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Missing => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Apply `f` to the coerced value
    ///
    /// Values that do not coerce are kept as they are, so a later evaluation
    /// can still report the raw input.
    #[must_use]
    pub fn map_coerced(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self.coerce() {
            Some(value) => Self::Number(f(value)),
            None => self,
        }
    }

    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<f64> for ForecastValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Option<f64>> for ForecastValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Number)
    }
}

impl From<&str> for ForecastValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for ForecastValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "\"{s}\""),
            Self::Missing => f.write_str("<missing>"),
        }
    }
}

/// One forecast hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    /// Local time of the hour, when the source provides it
    pub time: Option<NaiveDateTime>,
    /// Percent chance (0-100) that the hour stays dry
    pub dryness_chance: ForecastValue,
    /// Expected precipitation in millimetres
    pub precipitation_mm: ForecastValue,
}

impl HourlyRecord {
    #[must_use]
    pub fn new(
        dryness_chance: impl Into<ForecastValue>,
        precipitation_mm: impl Into<ForecastValue>,
    ) -> Self {
        Self {
            time: None,
            dryness_chance: dryness_chance.into(),
            precipitation_mm: precipitation_mm.into(),
        }
    }

    #[must_use]
    pub fn at(mut self, time: NaiveDateTime) -> Self {
        self.time = Some(time);
        self
    }
}

/// Raw per-candidate forecast, discarded after evaluation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastSample {
    pub hourly: Vec<HourlyRecord>,
    pub nearest_label: Option<String>,
}

impl ForecastSample {
    #[must_use]
    pub const fn new(hourly: Vec<HourlyRecord>) -> Self {
        Self {
            hourly,
            nearest_label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.nearest_label = Some(label.into());
        self
    }

    /// Build a sample where every hour has the same values
    #[must_use]
    pub fn uniform(hours: usize, dryness_chance: f64, precipitation_mm: f64) -> Self {
        Self::new(vec![HourlyRecord::new(dryness_chance, precipitation_mm); hours])
    }
}
