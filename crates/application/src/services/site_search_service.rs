//! Dry-site search use case
//!
//! Resolves the place, fans out forecast fetches over the nine candidates
//! with bounded concurrency and reduces the outcomes to a ranking once all
//! of them are in. Every external call is raced against the configured
//! timeout and the query's cancellation token.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use domain::DomainError;
use domain::search::{
    CandidatePoint, DEFAULT_WINDOW_HOURS, EvaluationWindow, SiteEvaluation, generate_candidates,
    rank_sites,
};
use domain::value_objects::{Coordinate, PlaceName, SearchRadius};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{ForecastPort, GeocodingPort};

/// Default per-call timeout in seconds
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

/// Default number of forecast fetches in flight at once
const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Configuration for the search use case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSearchConfig {
    /// Timeout for each external call in seconds (default: 15)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Maximum concurrent forecast fetches (default: 4, 1 = sequential)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Leading forecast hours that are scored (default: 24)
    #[serde(default = "default_window_hours")]
    pub window_hours: usize,
}

const fn default_fetch_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

const fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

const fn default_window_hours() -> usize {
    DEFAULT_WINDOW_HOURS
}

impl Default for SiteSearchConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout(),
            max_concurrency: default_max_concurrency(),
            window_hours: default_window_hours(),
        }
    }
}

impl SiteSearchConfig {
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Effective concurrency, never below one
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }

    /// # Errors
    ///
    /// Returns `DomainError::InvalidWindow` for a zero-hour window.
    pub fn window(&self) -> Result<EvaluationWindow, DomainError> {
        EvaluationWindow::new(self.window_hours)
    }
}

/// A validated search query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub place: PlaceName,
    pub radius: SearchRadius,
    /// Look up a nearest-place label for the winning site
    pub resolve_labels: bool,
}

impl SearchRequest {
    #[must_use]
    pub const fn new(place: PlaceName, radius: SearchRadius) -> Self {
        Self {
            place,
            radius,
            resolve_labels: false,
        }
    }

    /// Validate raw user input
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidInput` for an empty place name or a radius
    /// that is not a finite positive number.
    pub fn parse(place: &str, radius_km: f64) -> Result<Self, SearchError> {
        let place = PlaceName::new(place)?;
        let radius = SearchRadius::new(radius_km)?;
        Ok(Self::new(place, radius))
    }

    #[must_use]
    pub const fn with_labels(mut self, resolve_labels: bool) -> Self {
        self.resolve_labels = resolve_labels;
        self
    }
}

/// Why a candidate was left out of the ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// The forecast service failed or was unreachable
    Fetch(String),
    /// The forecast did not arrive within the per-call timeout
    Timeout,
    /// The forecast arrived but could not be scored
    IncompleteData(String),
    /// The offset landed outside valid coordinates (past a pole)
    OutOfRange,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(detail) => write!(f, "fetch failed: {detail}"),
            Self::Timeout => f.write_str("timed out"),
            Self::IncompleteData(detail) => write!(f, "incomplete data: {detail}"),
            Self::OutOfRange => f.write_str("coordinate out of range"),
        }
    }
}

/// A candidate that produced no evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateFailure {
    pub candidate: CandidatePoint,
    pub reason: FailureReason,
}

impl fmt::Display for CandidateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.candidate, self.reason)
    }
}

/// Query-level failures
#[derive(Debug, Error)]
pub enum SearchError {
    /// Rejected before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] DomainError),

    /// The geocoder knows no such place
    #[error("No location found for '{place}'")]
    NotFound { place: String },

    /// The geocoder itself failed
    #[error("Geocoding failed: {0}")]
    Geocoding(ApplicationError),

    /// Every candidate failed
    #[error("No usable weather data was obtained for any site around '{place}'")]
    NoSiteFound {
        place: String,
        failures: Vec<CandidateFailure>,
    },

    /// The service settings cannot run any query
    #[error("Invalid search configuration: {0}")]
    Configuration(String),

    /// The query was superseded or abandoned
    #[error("Search was cancelled")]
    Cancelled,

    /// Rendering the result failed
    #[error("Could not render result: {0}")]
    Presentation(ApplicationError),
}

impl SearchError {
    /// Whether the user can fix this by changing the query
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::NotFound { .. })
    }
}

/// Successful search result
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub place: PlaceName,
    pub origin: Coordinate,
    pub radius: SearchRadius,
    /// Best first, never empty
    pub ranked: Vec<SiteEvaluation>,
    pub failures: Vec<CandidateFailure>,
}

impl SearchReport {
    #[must_use]
    pub fn best(&self) -> Option<&SiteEvaluation> {
        self.ranked.first()
    }
}

/// Result of one guarded external call
enum BoundaryError {
    Cancelled,
    TimedOut,
    Failed(ApplicationError),
}

/// Per-candidate result, reduced once after the fan-out
enum CandidateOutcome {
    Evaluated(SiteEvaluation),
    Failed(CandidateFailure),
    Cancelled,
}

/// Service running one dry-site search per call
pub struct SiteSearchService {
    config: SiteSearchConfig,
    geocoder: Arc<dyn GeocodingPort>,
    forecast: Arc<dyn ForecastPort>,
}

impl fmt::Debug for SiteSearchService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteSearchService")
            .field("config", &self.config)
            .field("geocoder", &"<GeocodingPort>")
            .field("forecast", &"<ForecastPort>")
            .finish()
    }
}

impl SiteSearchService {
    #[must_use]
    pub fn new(geocoder: Arc<dyn GeocodingPort>, forecast: Arc<dyn ForecastPort>) -> Self {
        Self {
            config: SiteSearchConfig::default(),
            geocoder,
            forecast,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SiteSearchConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &SiteSearchConfig {
        &self.config
    }

    /// Run `call` under the per-call timeout, abandoning it on cancellation
    async fn guarded<T, F>(&self, cancel: &CancellationToken, call: F) -> Result<T, BoundaryError>
    where
        F: Future<Output = Result<T, ApplicationError>>,
    {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(BoundaryError::Cancelled),
            result = timeout(self.config.fetch_timeout(), call) => match result {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(BoundaryError::Failed(e)),
                Err(_) => Err(BoundaryError::TimedOut),
            },
        }
    }

    /// Find the driest site around `request.place`
    ///
    /// # Errors
    ///
    /// See [`SearchError`]. Individual candidate failures are not errors;
    /// they are listed in [`SearchReport::failures`].
    #[instrument(skip(self, cancel), fields(place = %request.place, radius_km = request.radius.km()))]
    pub async fn search(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchReport, SearchError> {
        let window = self
            .config
            .window()
            .map_err(|e| SearchError::Configuration(format!("window_hours: {e}")))?;
        let origin = self.resolve_origin(&request.place, cancel).await?;
        let candidates = generate_candidates(origin, request.radius)?;
        debug!(count = candidates.len(), origin = %origin, "Generated candidates");

        let outcomes: Vec<CandidateOutcome> = stream::iter(candidates)
            .map(|candidate| self.evaluate_candidate(candidate, window, cancel))
            .buffered(self.config.concurrency())
            .collect()
            .await;

        let mut sites = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                CandidateOutcome::Evaluated(site) => sites.push(site),
                CandidateOutcome::Failed(failure) => failures.push(failure),
                CandidateOutcome::Cancelled => return Err(SearchError::Cancelled),
            }
        }

        let mut ranked = rank_sites(sites);
        let Some(best) = ranked.first_mut() else {
            warn!(failures = failures.len(), "No candidate produced usable forecast data");
            return Err(SearchError::NoSiteFound {
                place: request.place.to_string(),
                failures,
            });
        };

        if request.resolve_labels {
            self.label_site(best, cancel).await;
        }
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        info!(
            best = %best.candidate,
            dryness_score = best.dryness_score,
            total_precipitation = best.total_precipitation,
            excluded = failures.len(),
            "Selected driest site"
        );

        Ok(SearchReport {
            place: request.place.clone(),
            origin,
            radius: request.radius,
            ranked,
            failures,
        })
    }

    async fn resolve_origin(
        &self,
        place: &PlaceName,
        cancel: &CancellationToken,
    ) -> Result<Coordinate, SearchError> {
        match self.guarded(cancel, self.geocoder.resolve(place.as_str())).await {
            Ok(Some(origin)) => Ok(origin),
            Ok(None) => Err(SearchError::NotFound {
                place: place.to_string(),
            }),
            Err(BoundaryError::Cancelled) => Err(SearchError::Cancelled),
            Err(BoundaryError::TimedOut) => Err(SearchError::Geocoding(ApplicationError::Timeout(
                format!(
                    "geocoding '{place}' took longer than {}s",
                    self.config.fetch_timeout_secs
                ),
            ))),
            Err(BoundaryError::Failed(e)) => Err(SearchError::Geocoding(e)),
        }
    }

    async fn evaluate_candidate(
        &self,
        candidate: CandidatePoint,
        window: EvaluationWindow,
        cancel: &CancellationToken,
    ) -> CandidateOutcome {
        if !candidate.coordinate.is_valid() {
            return Self::excluded(candidate, FailureReason::OutOfRange);
        }

        let fetched = self
            .guarded(cancel, self.forecast.fetch(&candidate.coordinate, window))
            .await;
        let sample = match fetched {
            Ok(sample) => sample,
            Err(BoundaryError::Cancelled) => return CandidateOutcome::Cancelled,
            Err(BoundaryError::TimedOut) => {
                return Self::excluded(candidate, FailureReason::Timeout);
            },
            Err(BoundaryError::Failed(ApplicationError::IncompleteData(detail))) => {
                return Self::excluded(candidate, FailureReason::IncompleteData(detail));
            },
            Err(BoundaryError::Failed(e)) => {
                return Self::excluded(candidate, FailureReason::Fetch(e.to_string()));
            },
        };

        match SiteEvaluation::from_sample(candidate, sample, window) {
            Ok(site) => {
                debug!(
                    candidate = %candidate,
                    dryness_score = site.dryness_score,
                    total_precipitation = site.total_precipitation,
                    "Candidate evaluated"
                );
                CandidateOutcome::Evaluated(site)
            },
            Err(e) => Self::excluded(candidate, FailureReason::IncompleteData(e.to_string())),
        }
    }

    fn excluded(candidate: CandidatePoint, reason: FailureReason) -> CandidateOutcome {
        warn!(candidate = %candidate, reason = %reason, "Candidate excluded");
        CandidateOutcome::Failed(CandidateFailure { candidate, reason })
    }

    async fn label_site(&self, site: &mut SiteEvaluation, cancel: &CancellationToken) {
        if site.nearest_label.is_some() {
            return;
        }
        match self
            .guarded(cancel, self.geocoder.label_for(&site.candidate.coordinate))
            .await
        {
            Ok(label) => site.nearest_label = label,
            Err(BoundaryError::Failed(e)) => {
                warn!(error = %e, "Could not resolve a label for the best site");
            },
            Err(BoundaryError::TimedOut) => warn!("Label lookup timed out"),
            Err(BoundaryError::Cancelled) => {},
        }
    }
}
