//! Best-site selection

use std::cmp::Ordering;

use super::evaluation::SiteEvaluation;

fn compare_sites(a: &SiteEvaluation, b: &SiteEvaluation) -> Ordering {
    b.dryness_score
        .total_cmp(&a.dryness_score)
        .then_with(|| a.total_precipitation.total_cmp(&b.total_precipitation))
}

/// Rank evaluations from best to worst
///
/// Higher dryness wins, then lower precipitation. Entries tied on both keep
/// their input order. Entries with a non-finite score are dropped.
#[must_use]
pub fn rank_sites(mut sites: Vec<SiteEvaluation>) -> Vec<SiteEvaluation> {
    sites.retain(|s| s.dryness_score.is_finite() && s.total_precipitation.is_finite());
    // sort_by is stable
    sites.sort_by(compare_sites);
    sites
}

/// Pick the single best evaluation, `None` when nothing is usable
#[must_use]
pub fn select_best(sites: Vec<SiteEvaluation>) -> Option<SiteEvaluation> {
    rank_sites(sites).into_iter().next()
}
