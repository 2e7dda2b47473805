//! Versioned parameter identifier tables
//!
//! The station network names its columns with opaque identifiers
//! (`tre200s0` is air temperature 2 m above ground, ten minute value).
//! These have changed upstream before. The table is explicit and
//! versioned so a rename is reported as drift instead of null data.

use serde::{Deserialize, Serialize};

use crate::error::MeteoSwissError;

/// Mapping from feed column identifiers to normalized reading fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterTable {
    /// Name reported in drift errors
    pub version: String,
    /// Timestamp column (`dd.mm.yyyy HH:MM`, UTC)
    pub timestamp_column: String,
    /// Air temperature in °C
    pub temperature: String,
    /// Relative humidity in %
    pub humidity: String,
    /// Wind speed column
    pub wind_speed: String,
    /// Factor converting the wind speed column to km/h
    pub wind_speed_scale: f64,
    /// Wind direction in degrees
    pub wind_direction: String,
    /// Station pressure in hPa
    pub pressure: String,
    /// Precipitation sum in mm
    pub precipitation: String,
    /// Minimum number of mapped identifiers that must be in the header
    pub min_present: usize,
}

impl Default for ParameterTable {
    fn default() -> Self {
        Self::ogd_smn_v1()
    }
}

impl ParameterTable {
    /// The table matching the open data station feed as of 2025
    pub fn ogd_smn_v1() -> Self {
        Self {
            version: "ogd-smn/v1".to_string(),
            timestamp_column: "reference_timestamp".to_string(),
            temperature: "tre200s0".to_string(),
            humidity: "ure200s0".to_string(),
            wind_speed: "fu3010z0".to_string(),
            wind_speed_scale: 1.0,
            wind_direction: "dkl010z0".to_string(),
            pressure: "prestas0".to_string(),
            precipitation: "rre150z0".to_string(),
            min_present: 3,
        }
    }

    /// Measurement identifiers, timestamp excluded
    pub fn identifiers(&self) -> [&str; 6] {
        [
            self.temperature.as_str(),
            self.humidity.as_str(),
            self.wind_speed.as_str(),
            self.wind_direction.as_str(),
            self.pressure.as_str(),
            self.precipitation.as_str(),
        ]
    }

    /// Check a header row against the table
    ///
    /// # Errors
    ///
    /// Returns [`MeteoSwissError::SchemaDrift`] when fewer than
    /// `min_present` identifiers appear in `headers`.
    pub fn validate<S: AsRef<str>>(&self, headers: &[S]) -> Result<(), MeteoSwissError> {
        let missing: Vec<String> = self
            .identifiers()
            .into_iter()
            .filter(|id| !headers.iter().any(|h| h.as_ref() == *id))
            .map(str::to_string)
            .collect();

        let present = self.identifiers().len() - missing.len();
        if present < self.min_present {
            return Err(MeteoSwissError::SchemaDrift {
                version: self.version.clone(),
                missing,
            });
        }
        Ok(())
    }
}
