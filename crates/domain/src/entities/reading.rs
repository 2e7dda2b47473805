//! Normalized current-conditions reading

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One snapshot of current conditions, independent of upstream field names
///
/// Every field is optional; partial upstream data is valid. A reading is
/// replaced wholesale by the next poll cycle, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReading {
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub observed_at: Option<DateTime<Utc>>,
}

impl NormalizedReading {
    /// Number of measured fields present (the timestamp does not count)
    #[must_use]
    pub fn present_fields(&self) -> usize {
        [
            self.temperature_c,
            self.humidity_pct,
            self.wind_speed_kmh,
            self.wind_direction_deg,
            self.precipitation_mm,
            self.pressure_hpa,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }

    /// True when no measured field is present
    ///
    /// An all-absent reading cannot be told apart from a broken field
    /// mapping and must not be published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.present_fields() == 0
    }
}
