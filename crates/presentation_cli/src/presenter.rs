//! Result presenters
//!
//! [`TextPresenter`] renders for a terminal; [`JsonPresenter`] renders one
//! JSON document for scripts.

use std::fmt::Write as _;

use application::error::ApplicationError;
use application::ports::ResultPresenterPort;
use domain::search::SiteEvaluation;
use domain::value_objects::{Coordinate, SearchRadius};
use serde::Serialize;

/// Link that opens a coordinate in Google Maps
#[must_use]
pub fn maps_link(coordinate: &Coordinate) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={:.6},{:.6}",
        coordinate.latitude(),
        coordinate.longitude()
    )
}

fn nothing_found(place_name: &str, radius: SearchRadius) -> String {
    format!(
        "No dry spot found within {radius} of {place_name}: no usable weather data was obtained."
    )
}

/// Human readable output
#[derive(Debug, Clone)]
pub struct TextPresenter {
    top: usize,
}

impl Default for TextPresenter {
    fn default() -> Self {
        Self { top: 1 }
    }
}

impl TextPresenter {
    /// Show the best `top` sites (at least the winner)
    #[must_use]
    pub fn with_top(top: usize) -> Self {
        Self { top: top.max(1) }
    }

    fn describe(site: &SiteEvaluation) -> String {
        let mut line = site.candidate.to_string();
        if let Some(label) = &site.nearest_label {
            let _ = write!(line, " near {label}");
        }
        line
    }
}

impl ResultPresenterPort for TextPresenter {
    fn render(
        &self,
        best: Option<&SiteEvaluation>,
        place_name: &str,
        radius: SearchRadius,
    ) -> Result<String, ApplicationError> {
        let Some(site) = best else {
            return Ok(nothing_found(place_name, radius));
        };

        let mut out = format!("Driest spot within {radius} of {place_name}:\n");
        let _ = writeln!(out, "  {}", Self::describe(site));
        let _ = writeln!(
            out,
            "  dry chance {:.1}%, {:.1} mm precipitation over {} h",
            site.dryness_score, site.total_precipitation, site.hours_evaluated
        );
        let _ = write!(out, "  {}", maps_link(&site.candidate.coordinate));
        Ok(out)
    }

    fn render_ranking(
        &self,
        ranked: &[SiteEvaluation],
        place_name: &str,
        radius: SearchRadius,
    ) -> Result<String, ApplicationError> {
        let mut out = self.render(ranked.first(), place_name, radius)?;

        let runners_up: Vec<&SiteEvaluation> = ranked.iter().skip(1).take(self.top - 1).collect();
        if !runners_up.is_empty() {
            out.push_str("\nRunners-up:");
            for (rank, site) in runners_up.iter().enumerate() {
                let _ = write!(
                    out,
                    "\n  {}. {}: {:.1}%, {:.1} mm",
                    rank + 2,
                    Self::describe(site),
                    site.dryness_score,
                    site.total_precipitation
                );
            }
        }
        Ok(out)
    }
}

/// Machine readable output
#[derive(Debug, Clone, Default)]
pub struct JsonPresenter {
    pretty: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    place: &'a str,
    radius_km: f64,
    found: bool,
    best: Option<JsonSite<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    runners_up: Vec<JsonSite<'a>>,
}

#[derive(Serialize)]
struct JsonSite<'a> {
    #[serde(flatten)]
    site: &'a SiteEvaluation,
    maps_url: String,
}

impl<'a> From<&'a SiteEvaluation> for JsonSite<'a> {
    fn from(site: &'a SiteEvaluation) -> Self {
        Self {
            site,
            maps_url: maps_link(&site.candidate.coordinate),
        }
    }
}

impl JsonPresenter {
    #[must_use]
    pub const fn pretty() -> Self {
        Self { pretty: true }
    }

    fn to_string(&self, report: &JsonReport<'_>) -> Result<String, ApplicationError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        json.map_err(|e| ApplicationError::Internal(format!("JSON rendering failed: {e}")))
    }
}

impl ResultPresenterPort for JsonPresenter {
    fn render(
        &self,
        best: Option<&SiteEvaluation>,
        place_name: &str,
        radius: SearchRadius,
    ) -> Result<String, ApplicationError> {
        self.to_string(&JsonReport {
            place: place_name,
            radius_km: radius.km(),
            found: best.is_some(),
            best: best.map(JsonSite::from),
            runners_up: Vec::new(),
        })
    }

    fn render_ranking(
        &self,
        ranked: &[SiteEvaluation],
        place_name: &str,
        radius: SearchRadius,
    ) -> Result<String, ApplicationError> {
        self.to_string(&JsonReport {
            place: place_name,
            radius_km: radius.km(),
            found: !ranked.is_empty(),
            best: ranked.first().map(JsonSite::from),
            runners_up: ranked.iter().skip(1).map(JsonSite::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use domain::search::{CandidateKind, CandidatePoint, CompassBearing};

    use super::*;

    fn site(kind: CandidateKind, dryness: f64, precipitation: f64) -> SiteEvaluation {
        SiteEvaluation {
            candidate: CandidatePoint {
                kind,
                coordinate: Coordinate::new(52.61009, 13.405).unwrap(),
            },
            dryness_score: dryness,
            total_precipitation: precipitation,
            nearest_label: None,
            hours_evaluated: 24,
        }
    }

    fn radius() -> SearchRadius {
        SearchRadius::new(10.0).unwrap()
    }

    #[test]
    fn maps_link_uses_six_decimals() {
        assert_eq!(
            maps_link(&Coordinate::berlin()),
            "https://www.google.com/maps/search/?api=1&query=52.520000,13.405000"
        );
    }

    #[test]
    fn text_renders_winner() {
        let mut best = site(CandidateKind::Offset(CompassBearing::North), 95.0, 0.0);
        best.nearest_label = Some("Pankow".to_string());

        let out = TextPresenter::default()
            .render(Some(&best), "Berlin", radius())
            .unwrap();
        assert!(out.starts_with("Driest spot within 10 km of Berlin:"));
        assert!(out.contains("N (52.610090, 13.405000) near Pankow"));
        assert!(out.contains("dry chance 95.0%, 0.0 mm precipitation over 24 h"));
        assert!(out.contains("query=52.610090,13.405000"));
    }

    #[test]
    fn text_renders_nothing_found() {
        let out = TextPresenter::default()
            .render(None, "Atlantis", radius())
            .unwrap();
        assert!(out.contains("No dry spot found within 10 km of Atlantis"));
    }

    #[test]
    fn text_ranking_respects_top() {
        let ranked = vec![
            site(CandidateKind::Origin, 90.0, 0.1),
            site(CandidateKind::Offset(CompassBearing::East), 80.0, 0.5),
            site(CandidateKind::Offset(CompassBearing::West), 70.0, 1.0),
        ];

        let out = TextPresenter::with_top(2)
            .render_ranking(&ranked, "Berlin", radius())
            .unwrap();
        assert!(out.contains("Runners-up:"));
        assert!(out.contains("2. E ("));
        assert!(!out.contains("3. W ("));

        let winner_only = TextPresenter::default()
            .render_ranking(&ranked, "Berlin", radius())
            .unwrap();
        assert!(!winner_only.contains("Runners-up"));
    }

    #[test]
    fn json_renders_ranking() {
        let ranked = vec![
            site(CandidateKind::Offset(CompassBearing::North), 95.0, 0.0),
            site(CandidateKind::Origin, 60.0, 4.8),
        ];
        let out = JsonPresenter::default()
            .render_ranking(&ranked, "Berlin", radius())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["place"], "Berlin");
        assert_eq!(value["radius_km"], 10.0);
        assert_eq!(value["found"], true);
        assert_eq!(value["best"]["candidate"]["kind"]["type"], "offset");
        assert_eq!(value["best"]["candidate"]["kind"]["bearing"], "north");
        assert_eq!(value["best"]["dryness_score"], 95.0);
        assert!(value["best"]["maps_url"].as_str().unwrap().contains("52.610090"));
        assert_eq!(value["runners_up"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn json_renders_nothing_found() {
        let out = JsonPresenter::pretty().render(None, "Atlantis", radius()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["found"], false);
        assert!(value["best"].is_null());
        assert!(value.get("runners_up").is_none());
        assert!(out.contains('\n'));
    }
}
