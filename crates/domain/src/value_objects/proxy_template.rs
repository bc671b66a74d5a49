//! URL-rewriting proxy template
//!
//! Some deployments cannot reach the weather or geocoding APIs directly and
//! route every request through a rewriting proxy instead. The template holds
//! a single `{url}` placeholder that receives the percent-encoded target URL.
//!
//! # Examples
//!
//! ```
//! use domain::value_objects::ProxyTemplate;
//!
//! let proxy = ProxyTemplate::parse("https://proxy.example/fetch?url={url}").unwrap();
//! assert_eq!(
//!     proxy.apply("https://api.example/a?b=1"),
//!     "https://proxy.example/fetch?url=https%3A%2F%2Fapi.example%2Fa%3Fb%3D1"
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use url::{Url, form_urlencoded};

use crate::errors::DomainError;

/// Placeholder replaced by the encoded target URL
pub const URL_PLACEHOLDER: &str = "{url}";

/// A validated proxy template containing exactly one `{url}` placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProxyTemplate(String);

impl ProxyTemplate {
    /// Parse and validate a template
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidProxyTemplate` if the placeholder is
    /// missing or repeated, or if the template is not an absolute http(s) URL.
    pub fn parse(template: impl Into<String>) -> Result<Self, DomainError> {
        let template = template.into().trim().to_string();

        match template.matches(URL_PLACEHOLDER).count() {
            0 => {
                return Err(DomainError::InvalidProxyTemplate(format!(
                    "missing {URL_PLACEHOLDER} placeholder"
                )));
            },
            1 => {},
            _ => {
                return Err(DomainError::InvalidProxyTemplate(format!(
                    "{URL_PLACEHOLDER} placeholder must appear exactly once"
                )));
            },
        }

        let probe = template.replace(URL_PLACEHOLDER, "probe");
        let parsed = Url::parse(&probe)
            .map_err(|e| DomainError::InvalidProxyTemplate(format!("{template}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DomainError::InvalidProxyTemplate(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        Ok(Self(template))
    }

    /// Rewrite a target URL through the proxy
    #[must_use]
    pub fn apply(&self, target: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
        self.0.replace(URL_PLACEHOLDER, &encoded)
    }

    /// Get the raw template
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProxyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProxyTemplate {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ProxyTemplate> for String {
    fn from(template: ProxyTemplate) -> Self {
        template.0
    }
}

/// Rewrite `target` through `proxy` when one is configured
#[must_use]
pub fn rewrite_url(proxy: Option<&ProxyTemplate>, target: &str) -> String {
    proxy.map_or_else(|| target.to_string(), |p| p.apply(target))
}
