//! Raw Nominatim response types

use serde::Deserialize;

/// One entry of a `/search` response
///
/// Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// `/reverse` response
///
/// When nothing is found Nominatim answers HTTP 200 with only an `error` field.
#[derive(Debug, Deserialize)]
pub(crate) struct ReverseResult {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ReverseResult {
    /// Short name if present, otherwise the full display name
    pub fn label(self) -> Option<String> {
        self.name
            .filter(|n| !n.trim().is_empty())
            .or(self.display_name)
            .filter(|n| !n.trim().is_empty())
    }
}
