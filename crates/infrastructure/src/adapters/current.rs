//! Current-conditions sources
//!
//! Cache first by `{source}:{location}` key, otherwise fetch under the retry
//! policy and write through on success.

use std::sync::Arc;

use application::{UpdateError, UpdateSource};
use async_trait::async_trait;
use domain::{GeoLocation, NormalizedReading};
use integration_meteoswiss::MeteoSwissClient;
use integration_openmeteo::OpenMeteoClient;
use tracing::{debug, instrument};

use super::error_map::{map_meteoswiss_error, map_openmeteo_error};
use super::station_resolver::StationResolver;
use crate::cache::{CacheRegistry, cache_key};
use crate::retry::{RetryConfig, retry_with_timeout};

/// Readings from the station network
#[derive(Debug)]
pub struct MeteoSwissCurrentSource {
    client: Arc<MeteoSwissClient>,
    station: Arc<StationResolver>,
    cache: Arc<CacheRegistry>,
    retry: RetryConfig,
}

impl MeteoSwissCurrentSource {
    pub fn new(
        client: Arc<MeteoSwissClient>,
        station: Arc<StationResolver>,
        cache: Arc<CacheRegistry>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            client,
            station,
            cache,
            retry,
        }
    }
}

#[async_trait]
impl UpdateSource<NormalizedReading> for MeteoSwissCurrentSource {
    fn name(&self) -> &'static str {
        "meteoswiss_current"
    }

    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<NormalizedReading, UpdateError> {
        let station = self.station.resolve().await?;
        let key = cache_key("meteoswiss", station.as_str());

        if let Some(cached) = self.cache.current.get(&key) {
            return Ok((*cached).clone());
        }

        let client = &self.client;
        let station_ref = &station;
        let result = retry_with_timeout(&self.retry, || async move {
            client
                .get_latest_reading(station_ref)
                .await
                .map_err(map_meteoswiss_error)
        })
        .await;

        let reading = match result {
            Ok(reading) => reading,
            Err(e @ UpdateError::SourceUnavailable(_)) => {
                // Nearest-station lookups may have picked a station without readings
                self.station.reset();
                return Err(e);
            },
            Err(e) => return Err(e),
        };

        debug!(station = %station, fields = reading.present_fields(), "Fetched station reading");
        self.cache.current.set(key, Arc::new(reading.clone()), None);
        Ok(reading)
    }
}

/// Current conditions from the open weather API
#[derive(Debug)]
pub struct OpenMeteoCurrentSource {
    client: Arc<OpenMeteoClient>,
    location: Option<GeoLocation>,
    cache: Arc<CacheRegistry>,
    retry: RetryConfig,
}

impl OpenMeteoCurrentSource {
    pub fn new(
        client: Arc<OpenMeteoClient>,
        location: Option<GeoLocation>,
        cache: Arc<CacheRegistry>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            client,
            location,
            cache,
            retry,
        }
    }
}

#[async_trait]
impl UpdateSource<NormalizedReading> for OpenMeteoCurrentSource {
    fn name(&self) -> &'static str {
        "openmeteo_current"
    }

    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<NormalizedReading, UpdateError> {
        let location = self
            .location
            .ok_or_else(|| UpdateError::unavailable("no coordinates configured"))?;
        let key = cache_key("openmeteo", &location.cache_fragment());

        if let Some(cached) = self.cache.current.get(&key) {
            return Ok((*cached).clone());
        }

        let client = &self.client;
        let reading = retry_with_timeout(&self.retry, || async move {
            client
                .get_current(&location)
                .await
                .map_err(map_openmeteo_error)
        })
        .await?;

        if reading.is_empty() {
            return Err(UpdateError::SchemaMismatch(
                "no mapped field present in current conditions".to_string(),
            ));
        }

        debug!(location = %location, fields = reading.present_fields(), "Fetched current conditions");
        self.cache.current.set(key, Arc::new(reading.clone()), None);
        Ok(reading)
    }
}
