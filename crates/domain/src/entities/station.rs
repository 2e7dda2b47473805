//! Measurement station entity

use serde::{Deserialize, Serialize};

use crate::value_objects::{GeoLocation, StationId};

/// A measurement station as listed in the station metadata feed
///
/// Stations without coordinates never become a `Station`; the directory
/// drops them while loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Canonical lowercase id (e.g. `ber`)
    pub id: StationId,
    /// Human readable name (e.g. `Bern / Zollikofen`)
    pub name: String,
    /// WGS84 position
    pub location: GeoLocation,
    /// Height above sea level in meters
    pub altitude_m: Option<f64>,
    /// Canton / region abbreviation (e.g. `BE`)
    pub region: Option<String>,
}

impl Station {
    /// Distance to a point in kilometers
    #[must_use]
    pub fn distance_to(&self, point: &GeoLocation) -> f64 {
        self.location.distance_km(point)
    }

    /// Whether the station belongs to the given region (case-insensitive)
    #[must_use]
    pub fn in_region(&self, region: &str) -> bool {
        self.region
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(region.trim()))
    }
}
