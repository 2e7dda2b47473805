//! Forecast chain links and the cached chain coordinator source

use std::sync::Arc;

use application::{ForecastChain, ForecastSource, UpdateError, UpdateSource};
use async_trait::async_trait;
use chrono::Utc;
use domain::{ForecastOrigin, ForecastPoint, ForecastSnapshot, GeoLocation, RegionCode};
use integration_meteoswiss::MeteoSwissClient;
use integration_openmeteo::OpenMeteoClient;
use tracing::{debug, instrument};

use super::error_map::{map_meteoswiss_error, map_openmeteo_error};
use super::station_resolver::StationResolver;
use crate::cache::{CacheRegistry, cache_key};
use crate::retry::{RetryConfig, retry_with_timeout};

// ==============================
// Open weather API (coordinates)
// ==============================

/// Hourly window from the open weather API, every attempt under retry
#[derive(Debug)]
pub struct OpenMeteoForecastSource {
    client: Arc<OpenMeteoClient>,
    location: Option<GeoLocation>,
    retry: RetryConfig,
}

impl OpenMeteoForecastSource {
    pub fn new(
        client: Arc<OpenMeteoClient>,
        location: Option<GeoLocation>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            client,
            location,
            retry,
        }
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoForecastSource {
    fn origin(&self) -> ForecastOrigin {
        ForecastOrigin::OpenMeteo
    }

    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<Vec<ForecastPoint>, UpdateError> {
        let location = self
            .location
            .ok_or_else(|| UpdateError::unavailable("no coordinates configured"))?;

        let client = &self.client;
        retry_with_timeout(&self.retry, || async move {
            client
                .get_hourly_forecast(&location, Utc::now())
                .await
                .map_err(map_openmeteo_error)
        })
        .await
    }
}

// ==============================
// Station feed (station id)
// ==============================

/// Rolling near-term values from the station's CSV feed
#[derive(Debug)]
pub struct StationFeedForecastSource {
    client: Arc<MeteoSwissClient>,
    station: Arc<StationResolver>,
}

impl StationFeedForecastSource {
    pub fn new(client: Arc<MeteoSwissClient>, station: Arc<StationResolver>) -> Self {
        Self { client, station }
    }
}

#[async_trait]
impl ForecastSource for StationFeedForecastSource {
    fn origin(&self) -> ForecastOrigin {
        ForecastOrigin::StationFeed
    }

    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<Vec<ForecastPoint>, UpdateError> {
        let station = self.station.resolve().await?;
        self.client
            .get_station_forecast(&station)
            .await
            .map_err(map_meteoswiss_error)
    }
}

// ==============================
// Region detail (postal code)
// ==============================

/// Graph or daily forecast from the region detail document
#[derive(Debug)]
pub struct RegionForecastSource {
    client: Arc<MeteoSwissClient>,
    region: Option<RegionCode>,
}

impl RegionForecastSource {
    pub fn new(client: Arc<MeteoSwissClient>, region: Option<RegionCode>) -> Self {
        Self { client, region }
    }
}

#[async_trait]
impl ForecastSource for RegionForecastSource {
    fn origin(&self) -> ForecastOrigin {
        ForecastOrigin::RegionDetail
    }

    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<Vec<ForecastPoint>, UpdateError> {
        let region = self
            .region
            .as_ref()
            .ok_or_else(|| UpdateError::unavailable("no postal code configured"))?;
        self.client
            .get_region_forecast(region, Utc::now())
            .await
            .map_err(map_meteoswiss_error)
    }
}

// ==============================
// Coordinator source
// ==============================

/// Resolves the [`ForecastChain`] for one location, caching the result
///
/// A snapshot is cached together with the origin that produced it, so a
/// refresh inside the TTL does not walk the chain again.
pub struct ChainForecastSource {
    chain: ForecastChain,
    cache: Arc<CacheRegistry>,
    key: String,
}

impl std::fmt::Debug for ChainForecastSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainForecastSource")
            .field("chain", &self.chain)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl ChainForecastSource {
    pub fn new(chain: ForecastChain, cache: Arc<CacheRegistry>, location_name: &str) -> Self {
        Self {
            chain,
            cache,
            key: cache_key("forecast", location_name),
        }
    }

    /// Origin of the last snapshot resolved by the chain itself
    pub fn last_origin(&self) -> Option<ForecastOrigin> {
        self.chain.last_origin()
    }
}

#[async_trait]
impl UpdateSource<ForecastSnapshot> for ChainForecastSource {
    fn name(&self) -> &'static str {
        "forecast_chain"
    }

    #[instrument(skip(self), fields(key = %self.key))]
    async fn fetch(&self) -> Result<ForecastSnapshot, UpdateError> {
        if let Some(cached) = self.cache.forecast.get(&self.key) {
            debug!(origin = %cached.origin, "Using cached forecast");
            return Ok((*cached).clone());
        }

        let snapshot = self.chain.resolve().await?;
        self.cache
            .forecast
            .set(self.key.clone(), Arc::new(snapshot.clone()), None);
        Ok(snapshot)
    }

    async fn close(&self) {
        self.chain.close().await;
    }
}
