//! Dry-site search core
//!
//! Pure functions only: candidate generation, forecast scoring and ranking.
//! Network access lives behind the application ports.

pub mod candidates;
pub mod evaluation;
pub mod forecast;
pub mod selection;

pub use candidates::{
    CANDIDATE_COUNT, CandidateKind, CandidatePoint, CompassBearing, KM_PER_DEGREE_LATITUDE,
    generate_candidates,
};
pub use evaluation::{
    DEFAULT_WINDOW_HOURS, EvaluationError, EvaluationWindow, ForecastField, SeriesSummary,
    SiteEvaluation, evaluate_series,
};
pub use forecast::{ForecastSample, ForecastValue, HourlyRecord};
pub use selection::{rank_sites, select_best};
