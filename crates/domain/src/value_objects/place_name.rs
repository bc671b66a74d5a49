//! Free-text place name as typed by the user

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// A non-empty, trimmed place name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlaceName(String);

impl PlaceName {
    /// Create a place name, trimming surrounding whitespace
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPlaceName` if nothing is left after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidPlaceName);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the place name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PlaceName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlaceName> for String {
    fn from(name: PlaceName) -> Self {
        name.0
    }
}

impl AsRef<str> for PlaceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
