//! Per-candidate forecast scoring

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::candidates::CandidatePoint;
use super::forecast::{ForecastSample, ForecastValue, HourlyRecord};
use crate::errors::DomainError;

/// Default number of leading hours that are scored
pub const DEFAULT_WINDOW_HOURS: usize = 24;

/// How many leading forecast hours are scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EvaluationWindow(usize);

impl EvaluationWindow {
    /// # Errors
    ///
    /// Returns `DomainError::InvalidWindow` for a zero-hour window.
    pub fn new(hours: usize) -> Result<Self, DomainError> {
        if hours == 0 {
            return Err(DomainError::InvalidWindow(hours));
        }
        Ok(Self(hours))
    }

    #[must_use]
    pub const fn hours(self) -> usize {
        self.0
    }

    /// Whole forecast days needed to cover the window
    #[must_use]
    pub const fn forecast_days(self) -> usize {
        self.0.div_ceil(24)
    }
}

impl Default for EvaluationWindow {
    fn default() -> Self {
        Self(DEFAULT_WINDOW_HOURS)
    }
}

impl<'de> Deserialize<'de> for EvaluationWindow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hours = usize::deserialize(deserializer)?;
        Self::new(hours).map_err(serde::de::Error::custom)
    }
}

/// Which hourly field a value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastField {
    DrynessChance,
    Precipitation,
}

impl fmt::Display for ForecastField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DrynessChance => f.write_str("dryness chance"),
            Self::Precipitation => f.write_str("precipitation"),
        }
    }
}

/// Why a forecast series could not be scored
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("Forecast series is empty")]
    EmptySeries,

    #[error("Forecast series truncated: expected {expected} hours, got {actual}")]
    TruncatedSeries { expected: usize, actual: usize },

    #[error("Unusable {field} value at hour {hour}: {raw}")]
    InvalidValue {
        hour: usize,
        field: ForecastField,
        raw: ForecastValue,
    },

    /// Every hour was in range but the aggregate overflowed
    #[error("Aggregated {field} is not a finite number")]
    NonFiniteTotal { field: ForecastField },
}

/// Aggregated score of one forecast series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSummary {
    /// Mean dryness chance in percent
    pub dryness_score: f64,
    /// Total precipitation in millimetres
    pub total_precipitation: f64,
    pub hours_evaluated: usize,
}

fn coerce_field(
    hour: usize,
    field: ForecastField,
    raw: &ForecastValue,
) -> Result<f64, EvaluationError> {
    let invalid = || EvaluationError::InvalidValue {
        hour,
        field,
        raw: raw.clone(),
    };
    let value = raw.coerce().ok_or_else(invalid)?;
    let in_range = match field {
        ForecastField::DrynessChance => (0.0..=100.0).contains(&value),
        ForecastField::Precipitation => value >= 0.0,
    };
    if in_range { Ok(value) } else { Err(invalid()) }
}

/// Score the leading `window` hours of a series
///
/// Dryness is averaged, precipitation summed. Any hour with a missing or
/// unusable value fails the whole series; values are never defaulted.
///
/// # Errors
///
/// See [`EvaluationError`].
pub fn evaluate_series(
    records: &[HourlyRecord],
    window: EvaluationWindow,
) -> Result<SeriesSummary, EvaluationError> {
    if records.is_empty() {
        return Err(EvaluationError::EmptySeries);
    }
    if records.len() < window.hours() {
        return Err(EvaluationError::TruncatedSeries {
            expected: window.hours(),
            actual: records.len(),
        });
    }

    let mut dryness_sum = 0.0;
    let mut total_precipitation = 0.0;

    for (hour, record) in records.iter().take(window.hours()).enumerate() {
        dryness_sum += coerce_field(hour, ForecastField::DrynessChance, &record.dryness_chance)?;
        total_precipitation +=
            coerce_field(hour, ForecastField::Precipitation, &record.precipitation_mm)?;
    }

    #[allow(clippy::cast_precision_loss)]
    let dryness_score = dryness_sum / window.hours() as f64;

    if !dryness_score.is_finite() {
        return Err(EvaluationError::NonFiniteTotal {
            field: ForecastField::DrynessChance,
        });
    }
    if !total_precipitation.is_finite() {
        return Err(EvaluationError::NonFiniteTotal {
            field: ForecastField::Precipitation,
        });
    }

    Ok(SeriesSummary {
        dryness_score,
        total_precipitation,
        hours_evaluated: window.hours(),
    })
}

/// A scored candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteEvaluation {
    pub candidate: CandidatePoint,
    pub dryness_score: f64,
    pub total_precipitation: f64,
    pub nearest_label: Option<String>,
    pub hours_evaluated: usize,
}

impl SiteEvaluation {
    /// Evaluate a fetched sample for `candidate`
    ///
    /// # Errors
    ///
    /// Propagates [`evaluate_series`] failures.
    pub fn from_sample(
        candidate: CandidatePoint,
        sample: ForecastSample,
        window: EvaluationWindow,
    ) -> Result<Self, EvaluationError> {
        let summary = evaluate_series(&sample.hourly, window)?;
        Ok(Self {
            candidate,
            dryness_score: summary.dryness_score,
            total_precipitation: summary.total_precipitation,
            nearest_label: sample.nearest_label,
            hours_evaluated: summary.hours_evaluated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::Coordinate;

    fn window(hours: usize) -> EvaluationWindow {
        EvaluationWindow::new(hours).unwrap()
    }

    #[test]
    fn window_validation() {
        assert_eq!(EvaluationWindow::new(0), Err(DomainError::InvalidWindow(0)));
        assert_eq!(EvaluationWindow::default().hours(), 24);
        assert_eq!(window(1).forecast_days(), 1);
        assert_eq!(window(24).forecast_days(), 1);
        assert_eq!(window(25).forecast_days(), 2);
        assert_eq!(window(72).forecast_days(), 3);
    }

    #[test]
    fn window_deserialization_validates() {
        let parsed: EvaluationWindow = serde_json::from_str("48").unwrap();
        assert_eq!(parsed.hours(), 48);
        assert!(serde_json::from_str::<EvaluationWindow>("0").is_err());
    }

    #[test]
    fn mean_and_sum() {
        let records = vec![
            HourlyRecord::new(80.0, 0.2),
            HourlyRecord::new(60.0, 0.0),
            HourlyRecord::new(100.0, 1.0),
        ];
        let summary = evaluate_series(&records, window(3)).unwrap();
        assert!((summary.dryness_score - 80.0).abs() < 1e-9);
        assert!((summary.total_precipitation - 1.2).abs() < 1e-9);
        assert_eq!(summary.hours_evaluated, 3);
    }

    #[test]
    fn only_leading_window_is_scored() {
        let mut records = vec![HourlyRecord::new(90.0, 0.0); 2];
        records.push(HourlyRecord::new(0.0, 50.0));
        let summary = evaluate_series(&records, window(2)).unwrap();
        assert!((summary.dryness_score - 90.0).abs() < 1e-9);
        assert!(summary.total_precipitation.abs() < 1e-9);
    }

    #[test]
    fn text_values_are_coerced() {
        let records = vec![HourlyRecord::new("70", " 0.5 "), HourlyRecord::new(90.0, "0")];
        let summary = evaluate_series(&records, window(2)).unwrap();
        assert!((summary.dryness_score - 80.0).abs() < 1e-9);
        assert!((summary.total_precipitation - 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_series() {
        assert_eq!(
            evaluate_series(&[], window(24)),
            Err(EvaluationError::EmptySeries)
        );
    }

    #[test]
    fn truncated_series() {
        let records = vec![HourlyRecord::new(80.0, 0.0); 10];
        assert_eq!(
            evaluate_series(&records, window(24)),
            Err(EvaluationError::TruncatedSeries {
                expected: 24,
                actual: 10
            })
        );
    }

    #[test]
    fn missing_value_is_not_zero() {
        let records = vec![
            HourlyRecord::new(80.0, 0.0),
            HourlyRecord::new(ForecastValue::Missing, 0.0),
        ];
        assert_eq!(
            evaluate_series(&records, window(2)),
            Err(EvaluationError::InvalidValue {
                hour: 1,
                field: ForecastField::DrynessChance,
                raw: ForecastValue::Missing,
            })
        );
    }

    #[test]
    fn unparsable_precipitation() {
        let records = vec![HourlyRecord::new(80.0, "heavy")];
        let err = evaluate_series(&records, window(1)).unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::InvalidValue {
                hour: 0,
                field: ForecastField::Precipitation,
                ..
            }
        ));
        assert!(err.to_string().contains("heavy"));
    }

    #[test]
    fn out_of_range_values() {
        assert!(evaluate_series(&[HourlyRecord::new(101.0, 0.0)], window(1)).is_err());
        assert!(evaluate_series(&[HourlyRecord::new(-1.0, 0.0)], window(1)).is_err());
        assert!(evaluate_series(&[HourlyRecord::new(50.0, -0.1)], window(1)).is_err());
        assert!(evaluate_series(&[HourlyRecord::new(0.0, 0.0)], window(1)).is_ok());
        assert!(evaluate_series(&[HourlyRecord::new(100.0, 0.0)], window(1)).is_ok());
    }

    #[test]
    fn overflowing_precipitation_total_is_rejected() {
        let records = vec![HourlyRecord::new(90.0, 1e308); 24];
        assert_eq!(
            evaluate_series(&records, window(24)),
            Err(EvaluationError::NonFiniteTotal {
                field: ForecastField::Precipitation
            })
        );
    }

    #[test]
    fn evaluation_is_idempotent() {
        let records = vec![HourlyRecord::new(33.3, 0.7); 24];
        let first = evaluate_series(&records, window(24)).unwrap();
        let second = evaluate_series(&records, window(24)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn site_evaluation_from_sample_keeps_label() {
        let candidate = CandidatePoint::origin(Coordinate::berlin());
        let sample = ForecastSample::uniform(24, 80.0, 0.05).with_label("Mitte");
        let site = SiteEvaluation::from_sample(candidate, sample, window(24)).unwrap();
        assert_eq!(site.candidate, candidate);
        assert_eq!(site.nearest_label.as_deref(), Some("Mitte"));
        assert!((site.total_precipitation - 1.2).abs() < 1e-9);
        assert_eq!(site.hours_evaluated, 24);
    }
}
