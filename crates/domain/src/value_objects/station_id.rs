//! Station identifier value object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DomainError;

/// Identifier of a measurement station
///
/// Station ids are case-insensitive; the canonical form is lowercase
/// (`"BER"`, `" ber "` and `"ber"` are the same station).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl StationId {
    /// Parse and canonicalize a station id
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStationId` for empty ids or ids containing
    /// characters other than ASCII alphanumerics, `-` and `_`.
    pub fn new(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || !trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::InvalidStationId(raw.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// The canonical lowercase id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StationId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<StationId> for String {
    fn from(value: StationId) -> Self {
        value.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
