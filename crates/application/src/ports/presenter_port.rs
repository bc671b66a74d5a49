//! Result rendering port

use domain::search::SiteEvaluation;
use domain::value_objects::SearchRadius;

use crate::error::ApplicationError;

/// Port for turning a search result into output text
pub trait ResultPresenterPort: Send + Sync {
    /// Render the best site, or a "nothing found" message for `None`
    fn render(
        &self,
        best: Option<&SiteEvaluation>,
        place_name: &str,
        radius: SearchRadius,
    ) -> Result<String, ApplicationError>;

    /// Render a best-first ranking
    ///
    /// Presenters that only ever show the winner can rely on the default.
    fn render_ranking(
        &self,
        ranked: &[SiteEvaluation],
        place_name: &str,
        radius: SearchRadius,
    ) -> Result<String, ApplicationError> {
        self.render(ranked.first(), place_name, radius)
    }
}
