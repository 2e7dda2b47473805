//! MeteoSwiss HTTP client

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use domain::{
    ForecastPoint, NormalizedReading, PollenMeasurement, PollenReport, PollenSpecies, RegionCode,
    StationId, WeatherAlert,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::MeteoSwissConfig;
use crate::csv::CsvTable;
use crate::detail::{alerts_from_detail, forecast_from_detail, select_window};
use crate::error::MeteoSwissError;
use crate::models::{RegionDetail, StacItem};
use crate::pollen::extract_level;
use crate::readings::{reading_from_table, station_forecast_from_table};
use crate::stations::StationIndex;

/// Readings file suffixes, most recent first
const ASSET_SUFFIXES: [&str; 2] = ["t_now", "t_recent"];

/// MeteoSwiss client for one process
///
/// Holds a pooled HTTP client; dropping the value releases the pool.
#[derive(Debug)]
pub struct MeteoSwissClient {
    client: Client,
    config: MeteoSwissConfig,
    tz: Tz,
}

impl MeteoSwissClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the timezone is unknown or the HTTP client cannot
    /// be initialized.
    pub fn new(config: MeteoSwissConfig) -> Result<Self, MeteoSwissError> {
        let tz: Tz = config.timezone.parse().map_err(|_| {
            MeteoSwissError::ConfigurationError(format!("Unknown timezone: {}", config.timezone))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MeteoSwissError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config, tz })
    }

    /// Create a client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_defaults() -> Result<Self, MeteoSwissError> {
        Self::new(MeteoSwissConfig::default())
    }

    pub fn config(&self) -> &MeteoSwissConfig {
        &self.config
    }

    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// URL of the most recent readings file of a station
    ///
    /// The STAC item lists every data file of the station; the `t_now`
    /// asset is preferred over `t_recent`.
    #[instrument(skip(self, station), fields(station = %station))]
    pub async fn discover_readings_url(&self, station: &StationId) -> Result<String, MeteoSwissError> {
        let url = format!(
            "{}/collections/{}/items/{}",
            self.config.stac_base_url, self.config.collection, station
        );
        let item: StacItem = self.get_json(&url, &[]).await?;

        for suffix in ASSET_SUFFIXES {
            let key = format!("{}_{station}_{suffix}.csv", self.config.asset_prefix());
            if let Some(asset) = item.assets.get(&key) {
                debug!(asset = %key, "Resolved readings asset");
                return Ok(asset.href.clone());
            }
        }

        Err(MeteoSwissError::NotFound(format!(
            "no readings asset for station {station}"
        )))
    }

    /// Latest normalized reading of a station
    ///
    /// # Errors
    ///
    /// Fails on transport errors, undecodable content, schema drift and
    /// when the latest row carries no mapped value.
    #[instrument(skip(self, station), fields(station = %station))]
    pub async fn get_latest_reading(
        &self,
        station: &StationId,
    ) -> Result<NormalizedReading, MeteoSwissError> {
        let url = self.discover_readings_url(station).await?;
        let bytes = self.get_bytes(&url).await?;
        let table = CsvTable::from_bytes(&bytes)?;
        debug!(rows = table.rows.len(), "Parsed readings file");
        reading_from_table(&table, &self.config.parameters)
    }

    /// Near-term points from the station's rolling feed
    #[instrument(skip(self, station), fields(station = %station))]
    pub async fn get_station_forecast(
        &self,
        station: &StationId,
    ) -> Result<Vec<ForecastPoint>, MeteoSwissError> {
        let url = format!(
            "{base}/{station}/{prefix}_{station}_t_now.csv",
            base = self.config.data_base_url,
            prefix = self.config.asset_prefix(),
        );
        let bytes = self.get_bytes(&url).await?;
        let table = CsvTable::from_bytes(&bytes)?;
        let points = station_forecast_from_table(&table, &self.config.parameters);
        debug!(points = points.len(), "Parsed station feed");
        Ok(points)
    }

    /// Download and index the station metadata feed
    #[instrument(skip(self))]
    pub async fn get_station_index(&self) -> Result<StationIndex, MeteoSwissError> {
        let bytes = self.get_bytes(&self.config.stations_url).await?;
        StationIndex::from_bytes(&bytes)
    }

    /// Active and announced warnings for a region
    #[instrument(skip(self, region), fields(region = %region))]
    pub async fn get_alerts(&self, region: &RegionCode) -> Result<Vec<WeatherAlert>, MeteoSwissError> {
        let detail = self.get_region_detail(region).await?;
        let alerts = alerts_from_detail(detail, region, self.tz);
        debug!(alerts = alerts.len(), "Parsed warnings");
        Ok(alerts)
    }

    /// Hourly forecast window derived from the region detail document
    #[instrument(skip(self, region), fields(region = %region))]
    pub async fn get_region_forecast(
        &self,
        region: &RegionCode,
        now: DateTime<Utc>,
    ) -> Result<Vec<ForecastPoint>, MeteoSwissError> {
        let detail = self.get_region_detail(region).await?;
        Ok(select_window(forecast_from_detail(&detail, self.tz), now))
    }

    /// Scrape one page per species and extract its level
    ///
    /// A species whose page fails to load or parse is left out; the report
    /// may therefore be empty.
    #[instrument(skip(self, region), fields(region = %region))]
    pub async fn get_pollen_pages(&self, region: &RegionCode) -> Result<PollenReport, MeteoSwissError> {
        let observed_at = Utc::now().with_timezone(&self.tz).naive_local();
        let mut report = PollenReport::default();

        for species in PollenSpecies::ALL {
            let url = self
                .config
                .pollen_page_url
                .replace("{species}", species.as_str())
                .replace("{postal_code}", region.postal_code());

            let markup = match self.get_text(&url).await {
                Ok(markup) => markup,
                Err(e) => {
                    warn!(species = %species, error = %e, "Pollen page unavailable");
                    continue;
                },
            };

            match extract_level(&markup) {
                Some(level) => {
                    report.insert(species, PollenMeasurement::from_index(level, Some(observed_at)));
                },
                None => debug!(species = %species, "No pollen level found on page"),
            }
        }

        Ok(report)
    }

    async fn get_region_detail(&self, region: &RegionCode) -> Result<RegionDetail, MeteoSwissError> {
        let plz = region.padded().to_string();
        self.get_json(&self.config.app_api_url, &[("plz", plz)]).await
    }

    async fn send(&self, url: &str, params: &[(&str, String)]) -> Result<Response, MeteoSwissError> {
        debug!(url = %url, "Requesting MeteoSwiss");

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MeteoSwissError::Timeout {
                        timeout_secs: self.config.timeout_secs,
                    }
                } else {
                    MeteoSwissError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MeteoSwissError::NotFound(url.to_string()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MeteoSwissError::RateLimitExceeded);
        }
        if status.is_server_error() {
            return Err(MeteoSwissError::ServiceUnavailable(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(MeteoSwissError::RequestFailed(format!("HTTP {status}")));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, MeteoSwissError> {
        self.send(url, params)
            .await?
            .json()
            .await
            .map_err(|e| MeteoSwissError::ParseError(e.to_string()))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, MeteoSwissError> {
        let bytes = self
            .send(url, &[])
            .await?
            .bytes()
            .await
            .map_err(|e| MeteoSwissError::ConnectionFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn get_text(&self, url: &str) -> Result<String, MeteoSwissError> {
        self.send(url, &[])
            .await?
            .text()
            .await
            .map_err(|e| MeteoSwissError::ConnectionFailed(e.to_string()))
    }
}
