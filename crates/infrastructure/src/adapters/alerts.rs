//! Warnings source
//!
//! No cache layer: every tick performs a live fetch.

use std::sync::Arc;

use application::{UpdateError, UpdateSource};
use async_trait::async_trait;
use domain::{RegionCode, WeatherAlert};
use integration_meteoswiss::MeteoSwissClient;
use tracing::{debug, instrument};

use super::error_map::map_meteoswiss_error;
use crate::retry::{RetryConfig, retry_with_timeout};

/// Warnings for one region
#[derive(Debug)]
pub struct AlertsSource {
    client: Arc<MeteoSwissClient>,
    region: RegionCode,
    retry: RetryConfig,
}

impl AlertsSource {
    pub fn new(client: Arc<MeteoSwissClient>, region: RegionCode, retry: RetryConfig) -> Self {
        Self {
            client,
            region,
            retry,
        }
    }
}

#[async_trait]
impl UpdateSource<Vec<WeatherAlert>> for AlertsSource {
    fn name(&self) -> &'static str {
        "meteoswiss_alerts"
    }

    #[instrument(skip(self), fields(region = %self.region))]
    async fn fetch(&self) -> Result<Vec<WeatherAlert>, UpdateError> {
        let client = &self.client;
        let region = &self.region;
        let alerts = retry_with_timeout(&self.retry, || async move {
            client.get_alerts(region).await.map_err(map_meteoswiss_error)
        })
        .await?;

        debug!(
            alerts = alerts.len(),
            critical = alerts.iter().filter(|a| a.is_critical()).count(),
            "Fetched warnings"
        );
        Ok(alerts)
    }
}
