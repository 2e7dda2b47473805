//! Per-location configuration: which coordinators run and what they poll.

use std::fmt;
use std::time::Duration;

use application::MIN_UPDATE_INTERVAL;
use domain::{DomainError, GeoLocation, RegionCode, StationId};
use serde::{Deserialize, Serialize};

use super::default_true;

// ==============================
// Source Selection
// ==============================

/// Upstream used for current conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrentSource {
    /// National station network readings
    #[default]
    MeteoSwiss,
    /// Generic open weather API at the configured coordinates
    OpenMeteo,
}

impl fmt::Display for CurrentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MeteoSwiss => write!(f, "meteoswiss"),
            Self::OpenMeteo => write!(f, "openmeteo"),
        }
    }
}

/// How pollen levels are obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollenMode {
    /// Structured air-quality API (needs coordinates)
    #[default]
    AirQuality,
    /// Scraped per-species pages (needs a postal code)
    Pages,
    /// No pollen coordinator
    Disabled,
}

impl fmt::Display for PollenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AirQuality => write!(f, "air_quality"),
            Self::Pages => write!(f, "pages"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

// ==============================
// Location Configuration
// ==============================

/// One monitored location
///
/// ```toml
/// [[locations]]
/// name = "home"
/// station_id = "KLO"
/// latitude = 47.48
/// longitude = 8.54
/// postal_code = "8302"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Name used in logs and as the cache key fragment
    pub name: String,

    /// Station abbreviation of the national network (e.g. "KLO")
    #[serde(default)]
    pub station_id: Option<String>,

    /// Latitude (-90.0 to 90.0)
    #[serde(default)]
    pub latitude: Option<f64>,

    /// Longitude (-180.0 to 180.0)
    #[serde(default)]
    pub longitude: Option<f64>,

    /// 4-digit postal code (or 6-digit region code) for warnings and pages
    #[serde(default)]
    pub postal_code: Option<String>,

    /// Poll period in seconds, raised to the minimum when lower
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,

    #[serde(default)]
    pub current_source: CurrentSource,

    #[serde(default)]
    pub pollen: PollenMode,

    /// Whether to run the warnings coordinator
    #[serde(default = "default_true")]
    pub alerts: bool,
}

const fn default_update_interval() -> u64 {
    MIN_UPDATE_INTERVAL.as_secs()
}

impl LocationConfig {
    /// A location with only a name; every input is unset
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            station_id: None,
            latitude: None,
            longitude: None,
            postal_code: None,
            update_interval_secs: default_update_interval(),
            current_source: CurrentSource::default(),
            pollen: PollenMode::default(),
            alerts: true,
        }
    }

    /// Configured poll period, before clamping
    #[must_use]
    pub const fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    /// Coordinates when both halves are set
    pub fn geo_location(&self) -> Result<Option<GeoLocation>, DomainError> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => GeoLocation::new(lat, lon).map(Some),
            _ => Ok(None),
        }
    }

    pub fn station(&self) -> Result<Option<StationId>, DomainError> {
        self.station_id.as_deref().map(StationId::new).transpose()
    }

    pub fn region(&self) -> Result<Option<RegionCode>, DomainError> {
        self.postal_code.as_deref().map(RegionCode::new).transpose()
    }

    /// Every reason this location cannot be polled as configured
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let name = &self.name;

        if name.trim().is_empty() {
            problems.push("location name must not be empty".to_string());
        }

        if self.latitude.is_some() != self.longitude.is_some() {
            problems.push(format!(
                "location '{name}': latitude and longitude must be set together"
            ));
        }

        let location = self.geo_location();
        if let Err(e) = &location {
            problems.push(format!("location '{name}': {e}"));
        }
        let station = self.station();
        if let Err(e) = &station {
            problems.push(format!("location '{name}': {e}"));
        }
        if let Err(e) = self.region() {
            problems.push(format!("location '{name}': {e}"));
        }

        let has_location = matches!(location, Ok(Some(_)));
        let has_station = matches!(station, Ok(Some(_)));

        if !has_location && !has_station {
            problems.push(format!(
                "location '{name}': needs a station_id or latitude/longitude"
            ));
        }
        if self.current_source == CurrentSource::OpenMeteo && !has_location {
            problems.push(format!(
                "location '{name}': current_source = openmeteo needs latitude/longitude"
            ));
        }
        if self.pollen == PollenMode::AirQuality && !has_location {
            problems.push(format!(
                "location '{name}': pollen = air_quality needs latitude/longitude"
            ));
        }
        if self.pollen == PollenMode::Pages && self.postal_code.is_none() {
            problems.push(format!(
                "location '{name}': pollen = pages needs a postal_code"
            ));
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zurich() -> LocationConfig {
        LocationConfig {
            station_id: Some("SMA".to_string()),
            latitude: Some(47.3769),
            longitude: Some(8.5417),
            postal_code: Some("8001".to_string()),
            ..LocationConfig::named("zurich")
        }
    }

    #[test]
    fn location_defaults_from_toml() {
        let config: LocationConfig = toml::from_str(r#"name = "home""#).unwrap();
        assert_eq!(config.update_interval(), Duration::from_secs(600));
        assert_eq!(config.current_source, CurrentSource::MeteoSwiss);
        assert_eq!(config.pollen, PollenMode::AirQuality);
        assert!(config.alerts);
    }

    #[test]
    fn source_names_deserialize() {
        let config: LocationConfig = toml::from_str(
            r#"
            name = "home"
            current_source = "openmeteo"
            pollen = "disabled"
            "#,
        )
        .unwrap();
        assert_eq!(config.current_source, CurrentSource::OpenMeteo);
        assert_eq!(config.pollen, PollenMode::Disabled);
        assert_eq!(PollenMode::AirQuality.to_string(), "air_quality");
    }

    #[test]
    fn complete_location_has_no_problems() {
        assert!(zurich().problems().is_empty());
        let config = zurich();
        assert_eq!(config.station().unwrap().unwrap().as_str(), "sma");
        assert_eq!(config.region().unwrap().unwrap().padded(), "800100");
        assert!(config.geo_location().unwrap().is_some());
    }

    #[test]
    fn station_id_is_lowercased() {
        let config = LocationConfig {
            station_id: Some(" SMA ".to_string()),
            pollen: PollenMode::Disabled,
            ..LocationConfig::named("upper")
        };
        let station = config.station().unwrap().unwrap();
        assert_eq!(station.as_str(), "sma");
        assert!(config.problems().is_empty());
    }

    #[test]
    fn location_without_station_or_coordinates_is_rejected() {
        let config = LocationConfig {
            pollen: PollenMode::Disabled,
            ..LocationConfig::named("nowhere")
        };
        let problems = config.problems();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("needs a station_id or latitude/longitude"));
    }

    #[test]
    fn half_coordinates_are_rejected() {
        let config = LocationConfig {
            latitude: None,
            ..zurich()
        };
        assert!(
            config
                .problems()
                .iter()
                .any(|p| p.contains("must be set together"))
        );
    }

    #[test]
    fn invalid_values_are_reported() {
        let config = LocationConfig {
            latitude: Some(95.0),
            postal_code: Some("80".to_string()),
            ..zurich()
        };
        let problems = config.problems();
        assert!(problems.iter().any(|p| p.contains("coordinates")));
        assert!(problems.iter().any(|p| p.contains("80")));
    }

    #[test]
    fn pages_mode_needs_postal_code() {
        let config = LocationConfig {
            pollen: PollenMode::Pages,
            postal_code: None,
            ..zurich()
        };
        assert!(config.problems().iter().any(|p| p.contains("postal_code")));
    }

    #[test]
    fn openmeteo_current_needs_coordinates() {
        let config = LocationConfig {
            station_id: Some("SMA".to_string()),
            current_source: CurrentSource::OpenMeteo,
            pollen: PollenMode::Disabled,
            ..LocationConfig::named("station-only")
        };
        assert!(
            config
                .problems()
                .iter()
                .any(|p| p.contains("current_source = openmeteo"))
        );
    }
}
