//! Latest-query-wins coordination
//!
//! Starting a query cancels the one before it. Each query carries the
//! generation it was started in; its result is only rendered and displayed
//! while that generation is still the newest, so a straggler from an
//! abandoned query can never replace newer output.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::site_search_service::{SearchError, SearchReport, SearchRequest, SiteSearchService};
use crate::ports::ResultPresenterPort;

/// Handle for one started query
#[derive(Debug, Clone)]
pub struct QueryTicket {
    generation: u64,
    token: CancellationToken,
}

impl QueryTicket {
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Output accepted for display
#[derive(Debug, Clone)]
pub struct Published {
    pub generation: u64,
    pub rendered: String,
    pub report: SearchReport,
}

struct LatestQuery {
    generation: u64,
    token: CancellationToken,
    displayed: Option<(u64, String)>,
}

/// Owns the "latest query" state for one output surface
pub struct SearchCoordinator {
    service: Arc<SiteSearchService>,
    presenter: Arc<dyn ResultPresenterPort>,
    latest: Mutex<LatestQuery>,
}

impl fmt::Debug for SearchCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCoordinator")
            .field("service", &self.service)
            .field("presenter", &"<ResultPresenterPort>")
            .field("generation", &self.generation())
            .finish()
    }
}

impl SearchCoordinator {
    #[must_use]
    pub fn new(service: Arc<SiteSearchService>, presenter: Arc<dyn ResultPresenterPort>) -> Self {
        Self {
            service,
            presenter,
            latest: Mutex::new(LatestQuery {
                generation: 0,
                token: CancellationToken::new(),
                displayed: None,
            }),
        }
    }

    /// Start a new query, cancelling whatever ran before
    pub fn begin(&self) -> QueryTicket {
        let mut latest = self.latest.lock();
        latest.token.cancel();
        latest.generation += 1;
        latest.token = CancellationToken::new();
        debug!(generation = latest.generation, "Query started");
        QueryTicket {
            generation: latest.generation,
            token: latest.token.clone(),
        }
    }

    /// Abandon the current query without starting another
    pub fn cancel_current(&self) {
        self.latest.lock().token.cancel();
    }

    #[must_use]
    pub fn is_current(&self, ticket: &QueryTicket) -> bool {
        self.latest.lock().generation == ticket.generation
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.latest.lock().generation
    }

    /// Most recently displayed output
    #[must_use]
    pub fn displayed(&self) -> Option<String> {
        self.latest
            .lock()
            .displayed
            .as_ref()
            .map(|(_, rendered)| rendered.clone())
    }

    /// Generation whose output is on display
    #[must_use]
    pub fn displayed_generation(&self) -> Option<u64> {
        self.latest
            .lock()
            .displayed
            .as_ref()
            .map(|(generation, _)| *generation)
    }

    /// Run a query to completion and publish it if nothing newer started
    ///
    /// # Errors
    ///
    /// Returns the search error, or `SearchError::Cancelled` when a newer
    /// query superseded this one.
    #[instrument(skip(self, request), fields(place = %request.place))]
    pub async fn run(&self, request: SearchRequest) -> Result<Published, SearchError> {
        let ticket = self.begin();
        let outcome = self.service.search(&request, ticket.token()).await;
        self.publish(&ticket, &request, outcome)
    }

    fn publish(
        &self,
        ticket: &QueryTicket,
        request: &SearchRequest,
        outcome: Result<SearchReport, SearchError>,
    ) -> Result<Published, SearchError> {
        // Checked and written under one lock so no newer query can interleave
        let mut latest = self.latest.lock();
        if latest.generation != ticket.generation {
            debug!(
                generation = ticket.generation,
                current = latest.generation,
                "Discarding superseded result"
            );
            return Err(SearchError::Cancelled);
        }

        let report = outcome?;
        let rendered = self
            .presenter
            .render_ranking(&report.ranked, request.place.as_str(), request.radius)
            .map_err(SearchError::Presentation)?;
        latest.displayed = Some((ticket.generation, rendered.clone()));

        Ok(Published {
            generation: ticket.generation,
            rendered,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use domain::search::{EvaluationWindow, ForecastSample, SiteEvaluation};
    use domain::value_objects::{Coordinate, SearchRadius};

    use super::*;
    use crate::error::ApplicationError;
    use crate::ports::{ForecastPort, MockForecastPort, MockGeocodingPort};

    struct EchoPresenter;

    impl ResultPresenterPort for EchoPresenter {
        fn render(
            &self,
            best: Option<&SiteEvaluation>,
            place_name: &str,
            _radius: SearchRadius,
        ) -> Result<String, ApplicationError> {
            Ok(format!(
                "{place_name}: {}",
                best.map_or_else(|| "none".to_string(), |s| s.candidate.coordinate.to_string())
            ))
        }
    }

    /// Answers instantly except for one coordinate, which takes a while
    struct DelayedForecast {
        slow: Coordinate,
    }

    #[async_trait]
    impl ForecastPort for DelayedForecast {
        async fn fetch(
            &self,
            coordinate: &Coordinate,
            window: EvaluationWindow,
        ) -> Result<ForecastSample, ApplicationError> {
            if *coordinate == self.slow {
                tokio::time::sleep(Duration::from_secs(10)).await;
            }
            Ok(ForecastSample::uniform(window.hours(), 80.0, 0.0))
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    fn geocoder() -> MockGeocodingPort {
        let mut mock = MockGeocodingPort::new();
        mock.expect_resolve().returning(|place| {
            Ok(Some(if place == "Slowtown" {
                Coordinate::berlin()
            } else {
                Coordinate::london()
            }))
        });
        mock
    }

    fn coordinator(forecast: impl ForecastPort + 'static) -> SearchCoordinator {
        let service = SiteSearchService::new(Arc::new(geocoder()), Arc::new(forecast));
        SearchCoordinator::new(Arc::new(service), Arc::new(EchoPresenter))
    }

    fn request(place: &str) -> SearchRequest {
        SearchRequest::parse(place, 10.0).unwrap()
    }

    #[test]
    fn begin_cancels_previous_query() {
        let coordinator = coordinator(MockForecastPort::new());
        let first = coordinator.begin();
        let second = coordinator.begin();

        assert!(first.token().is_cancelled());
        assert!(!second.token().is_cancelled());
        assert!(!coordinator.is_current(&first));
        assert!(coordinator.is_current(&second));
        assert_eq!(coordinator.generation(), 2);
        assert_eq!(second.generation(), 2);
    }

    #[test]
    fn cancel_current_keeps_generation() {
        let coordinator = coordinator(MockForecastPort::new());
        let ticket = coordinator.begin();
        coordinator.cancel_current();
        assert!(ticket.token().is_cancelled());
        assert!(coordinator.is_current(&ticket));
    }

    #[tokio::test]
    async fn run_publishes_current_result() {
        let mut forecast = MockForecastPort::new();
        forecast
            .expect_fetch()
            .returning(|_, window| Ok(ForecastSample::uniform(window.hours(), 90.0, 0.0)));
        let coordinator = coordinator(forecast);

        let published = coordinator.run(request("Fasttown")).await.unwrap();
        assert_eq!(published.generation, 1);
        assert!(published.rendered.starts_with("Fasttown: "));
        assert_eq!(coordinator.displayed(), Some(published.rendered));
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_query_never_publishes() {
        let coordinator = coordinator(DelayedForecast {
            slow: Coordinate::berlin(),
        });

        let (first, second) = tokio::join!(coordinator.run(request("Slowtown")), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            coordinator.run(request("Fasttown")).await
        });

        assert!(matches!(first, Err(SearchError::Cancelled)));
        let second = second.unwrap();
        assert_eq!(second.generation, 2);
        assert!(coordinator.displayed().unwrap().starts_with("Fasttown"));
        assert_eq!(coordinator.displayed_generation(), Some(2));
    }

    #[tokio::test]
    async fn stale_outcome_is_discarded_at_publish() {
        let mut forecast = MockForecastPort::new();
        forecast
            .expect_fetch()
            .returning(|_, window| Ok(ForecastSample::uniform(window.hours(), 90.0, 0.0)));
        let coordinator = coordinator(forecast);

        let newer = coordinator.run(request("Fasttown")).await.unwrap();

        // Finished a search for an older generation after the newer one displayed
        let stale_ticket = QueryTicket {
            generation: newer.generation - 1,
            token: CancellationToken::new(),
        };
        let result = coordinator.publish(
            &stale_ticket,
            &request("Slowtown"),
            Ok(newer.report.clone()),
        );

        assert!(matches!(result, Err(SearchError::Cancelled)));
        assert_eq!(coordinator.displayed(), Some(newer.rendered));
        assert_eq!(coordinator.displayed_generation(), Some(newer.generation));
    }

    #[tokio::test]
    async fn search_errors_are_not_displayed() {
        let mut forecast = MockForecastPort::new();
        forecast
            .expect_fetch()
            .returning(|_, _| Err(ApplicationError::ExternalService("down".into())));
        let coordinator = coordinator(forecast);

        let err = coordinator.run(request("Fasttown")).await.unwrap_err();
        assert!(matches!(err, SearchError::NoSiteFound { .. }));
        assert!(coordinator.displayed().is_none());
        assert!(coordinator.displayed_generation().is_none());
    }
}
