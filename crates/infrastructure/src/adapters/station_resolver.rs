//! Station lookup for a location

use std::sync::Arc;

use application::UpdateError;
use domain::{GeoLocation, StationId};
use integration_meteoswiss::StationDirectory;
use parking_lot::Mutex;
use tracing::{debug, info};

use super::error_map::map_meteoswiss_error;
use crate::cache::CacheRegistry;

/// Cache key of the station metadata index
pub const STATION_INDEX_KEY: &str = "stations:meteoswiss";

/// Furthest station accepted when resolving by coordinates
pub const NEAREST_STATION_MAX_KM: f64 = 50.0;

/// Yields the station a location is polled from
///
/// A configured station id wins. Otherwise the nearest station to the
/// configured coordinates is looked up once and remembered.
pub struct StationResolver {
    fixed: Option<StationId>,
    location: Option<GeoLocation>,
    directory: Arc<StationDirectory>,
    cache: Arc<CacheRegistry>,
    resolved: Mutex<Option<StationId>>,
}

impl std::fmt::Debug for StationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StationResolver")
            .field("fixed", &self.fixed)
            .field("location", &self.location)
            .field("resolved", &*self.resolved.lock())
            .finish_non_exhaustive()
    }
}

impl StationResolver {
    pub fn new(
        fixed: Option<StationId>,
        location: Option<GeoLocation>,
        directory: Arc<StationDirectory>,
        cache: Arc<CacheRegistry>,
    ) -> Self {
        Self {
            fixed,
            location,
            directory,
            cache,
            resolved: Mutex::new(None),
        }
    }

    /// Station to poll, or `SourceUnavailable` when none can be determined
    pub async fn resolve(&self) -> Result<StationId, UpdateError> {
        if let Some(station) = &self.fixed {
            return Ok(station.clone());
        }
        if let Some(station) = self.resolved.lock().clone() {
            return Ok(station);
        }

        let location = self
            .location
            .ok_or_else(|| UpdateError::unavailable("no station id or coordinates configured"))?;

        let directory = &self.directory;
        let index = self
            .cache
            .stations
            .get_or_set(STATION_INDEX_KEY, None, || async move {
                directory.reload().await.map_err(map_meteoswiss_error)
            })
            .await?;

        let (station, distance_km) = index
            .nearest(&location, NEAREST_STATION_MAX_KM, 1)
            .into_iter()
            .next()
            .map(|(station, distance)| (station.id.clone(), distance))
            .ok_or_else(|| {
                UpdateError::unavailable(format!(
                    "no station within {NEAREST_STATION_MAX_KM} km of {location}"
                ))
            })?;

        info!(station = %station, distance_km, location = %location, "Resolved nearest station");
        *self.resolved.lock() = Some(station.clone());
        Ok(station)
    }

    /// Forget a resolved station so the next call looks it up again
    pub fn reset(&self) {
        if self.resolved.lock().take().is_some() {
            debug!("Resolved station cleared");
        }
    }
}
