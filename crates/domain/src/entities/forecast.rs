//! Hourly and daily forecast records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::WeatherCondition;

/// One hourly forecast value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub at: DateTime<Utc>,
    pub temperature_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub precipitation_probability_pct: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub condition: WeatherCondition,
}

impl ForecastPoint {
    /// A point carrying only a timestamp and condition
    #[must_use]
    pub const fn new(at: DateTime<Utc>, condition: WeatherCondition) -> Self {
        Self {
            at,
            temperature_c: None,
            precipitation_mm: None,
            precipitation_probability_pct: None,
            wind_speed_kmh: None,
            wind_direction_deg: None,
            condition,
        }
    }
}

/// Which upstream satisfied a forecast cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastOrigin {
    /// Generic open weather API (coordinates)
    OpenMeteo,
    /// Station network CSV feed (station id)
    StationFeed,
    /// Region-keyed detail API (postal code)
    RegionDetail,
}

impl ForecastOrigin {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenMeteo => "openmeteo",
            Self::StationFeed => "station_feed",
            Self::RegionDetail => "region_detail",
        }
    }
}

impl fmt::Display for ForecastOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered hourly points plus the source that produced them
///
/// Replaced wholesale each cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub origin: ForecastOrigin,
    pub points: Vec<ForecastPoint>,
}

/// Per-day summary synthesized from hourly points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// Condition of the point nearest midday
    pub condition: WeatherCondition,
    /// Temperature of the point nearest midday
    pub temperature_c: Option<f64>,
    pub temperature_min_c: Option<f64>,
    pub temperature_max_c: Option<f64>,
    /// Sum over the day's points; absent when no point reported a value
    pub precipitation_mm: Option<f64>,
    pub precipitation_probability_pct: Option<f64>,
}
