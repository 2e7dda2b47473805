//! Pollen sources
//!
//! The air-quality API is the structured path and is cached. Scraped pages
//! are the best-effort fallback and only remember the last good report.

use std::sync::Arc;

use application::{UpdateError, UpdateSource};
use async_trait::async_trait;
use domain::{GeoLocation, PollenReport, RegionCode};
use integration_meteoswiss::MeteoSwissClient;
use integration_openmeteo::OpenMeteoClient;
use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use super::error_map::{map_meteoswiss_error, map_openmeteo_error};
use crate::cache::{CacheRegistry, cache_key};
use crate::retry::{RetryConfig, retry_with_timeout};

/// Concentrations from the air-quality API
#[derive(Debug)]
pub struct AirQualityPollenSource {
    client: Arc<OpenMeteoClient>,
    location: Option<GeoLocation>,
    cache: Arc<CacheRegistry>,
    retry: RetryConfig,
}

impl AirQualityPollenSource {
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
impl UpdateSource<PollenReport> for AirQualityPollenSource {
    fn name(&self) -> &'static str {
        "air_quality_pollen"
    }

    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<PollenReport, UpdateError> {
        let location = self
            .location
            .ok_or_else(|| UpdateError::unavailable("no coordinates configured"))?;
        let key = cache_key("air_quality", &location.cache_fragment());

        if let Some(cached) = self.cache.pollen.get(&key) {
            return Ok((*cached).clone());
        }

        let client = &self.client;
        let report = retry_with_timeout(&self.retry, || async move {
            client.get_pollen(&location).await.map_err(map_openmeteo_error)
        })
        .await?;

        if report.is_empty() {
            return Err(UpdateError::EmptyPayload("air-quality pollen".to_string()));
        }

        debug!(species = report.len(), "Fetched pollen concentrations");
        self.cache.pollen.set(key, Arc::new(report.clone()), None);
        Ok(report)
    }
}

/// Levels scraped from the per-species forecast pages
pub struct PollenPagesSource {
    client: Arc<MeteoSwissClient>,
    region: RegionCode,
    last_good: Mutex<Option<PollenReport>>,
}

impl std::fmt::Debug for PollenPagesSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollenPagesSource")
            .field("region", &self.region)
            .field("has_last_good", &self.last_good.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl PollenPagesSource {
    pub fn new(client: Arc<MeteoSwissClient>, region: RegionCode) -> Self {
        Self {
            client,
            region,
            last_good: Mutex::new(None),
        }
    }
}

#[async_trait]
impl UpdateSource<PollenReport> for PollenPagesSource {
    fn name(&self) -> &'static str {
        "pollen_pages"
    }

    #[instrument(skip(self), fields(region = %self.region))]
    async fn fetch(&self) -> Result<PollenReport, UpdateError> {
        let report = self
            .client
            .get_pollen_pages(&self.region)
            .await
            .map_err(map_meteoswiss_error)?;

        if !report.is_empty() {
            debug!(species = report.len(), "Scraped pollen levels");
            *self.last_good.lock() = Some(report.clone());
            return Ok(report);
        }

        match self.last_good.lock().clone() {
            Some(previous) => {
                warn!("No species parsed from pollen pages, reusing last good report");
                Ok(previous)
            },
            None => Err(UpdateError::EmptyPayload("pollen pages".to_string())),
        }
    }
}
