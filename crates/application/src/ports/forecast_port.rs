//! Forecast service port
//!
//! Defines the interface for hourly precipitation forecasts.

use async_trait::async_trait;
use domain::search::{EvaluationWindow, ForecastSample};
use domain::value_objects::Coordinate;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for hourly forecast retrieval
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ForecastPort: Send + Sync {
    /// Fetch enough hourly records to cover `window`
    ///
    /// The series starts at local midnight of the first forecast day at
    /// `coordinate`, not at the current hour.
    ///
    /// Adapters report payloads they cannot interpret as
    /// `ApplicationError::IncompleteData`.
    async fn fetch(
        &self,
        coordinate: &Coordinate,
        window: EvaluationWindow,
    ) -> Result<ForecastSample, ApplicationError>;

    /// Check if the forecast service is reachable
    async fn is_available(&self) -> bool;
}
