//! Postal/region code value object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DomainError;

/// Region code used to key warnings, detail forecasts and pollen pages
///
/// Accepts a 4-digit postal code or an already padded 6-digit code. The
/// upstream detail API expects the padded form (`8001` becomes `800100`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionCode(String);

impl RegionCode {
    /// Parse a postal or region code
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRegionCode` unless the input is 4 or 6
    /// ASCII digits.
    pub fn new(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::InvalidRegionCode(raw.to_string()));
        }
        match trimmed.len() {
            4 => Ok(Self(format!("{trimmed}00"))),
            6 => Ok(Self(trimmed.to_string())),
            _ => Err(DomainError::InvalidRegionCode(raw.to_string())),
        }
    }

    /// The 6-digit padded code
    #[must_use]
    pub fn padded(&self) -> &str {
        &self.0
    }

    /// The 4-digit postal code
    #[must_use]
    pub fn postal_code(&self) -> &str {
        &self.0[..4]
    }
}

impl TryFrom<String> for RegionCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<RegionCode> for String {
    fn from(value: RegionCode) -> Self {
        value.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.postal_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_four_digit_postal_code() {
        let code = RegionCode::new("8001").unwrap();
        assert_eq!(code.padded(), "800100");
        assert_eq!(code.postal_code(), "8001");
    }

    #[test]
    fn test_keeps_six_digit_code() {
        let code = RegionCode::new("300500").unwrap();
        assert_eq!(code.padded(), "300500");
        assert_eq!(code.to_string(), "3005");
    }

    #[test]
    fn test_rejects_malformed_codes() {
        assert!(RegionCode::new("80011").is_err());
        assert!(RegionCode::new("80a1").is_err());
        assert!(RegionCode::new("").is_err());
    }

    #[test]
    fn test_serde_round_trip_keeps_padding() {
        let code: RegionCode = serde_json::from_str("\"1200\"").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"120000\"");
    }
}
