//! Open-Meteo HTTP client

use std::time::Duration;

use chrono::{DateTime, DurationRound, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use domain::{
    ForecastPoint, GeoLocation, NormalizedReading, PollenMeasurement, PollenReport,
    PollenSpecies, WeatherCondition,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::OpenMeteoConfig;
use crate::error::OpenMeteoError;
use crate::models::{AirQualityResponse, ForecastResponse, HourlyBlock, PollenHourly, at};

/// Number of hourly points in one forecast window
pub const HOURLY_WINDOW: usize = 24;

const CURRENT_VARIABLES: &str = "temperature_2m,relative_humidity_2m,pressure_msl,\
                                 wind_speed_10m,wind_direction_10m,precipitation,weather_code";

const HOURLY_VARIABLES: &str = "temperature_2m,precipitation,precipitation_probability,\
                                weather_code,wind_speed_10m,wind_direction_10m";

const POLLEN_VARIABLES: &str =
    "alder_pollen,birch_pollen,grass_pollen,mugwort_pollen,ragweed_pollen";

/// Open-Meteo client for one process
#[derive(Debug)]
pub struct OpenMeteoClient {
    client: Client,
    config: OpenMeteoConfig,
    tz: Tz,
}

impl OpenMeteoClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the timezone is unknown or the HTTP client cannot
    /// be initialized.
    pub fn new(config: OpenMeteoConfig) -> Result<Self, OpenMeteoError> {
        let tz: Tz = config.timezone.parse().map_err(|_| {
            OpenMeteoError::ConfigurationError(format!("Unknown timezone: {}", config.timezone))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OpenMeteoError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config, tz })
    }

    /// Create a client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_defaults() -> Result<Self, OpenMeteoError> {
        Self::new(OpenMeteoConfig::default())
    }

    /// Current conditions at a location
    #[instrument(skip(self, location), fields(location = %location))]
    pub async fn get_current(
        &self,
        location: &GeoLocation,
    ) -> Result<NormalizedReading, OpenMeteoError> {
        let url = format!("{}/forecast", self.config.forecast_base_url);
        let params = [
            ("latitude", location.latitude().to_string()),
            ("longitude", location.longitude().to_string()),
            ("current", CURRENT_VARIABLES.to_string()),
            ("timezone", self.config.timezone.clone()),
        ];

        let response: ForecastResponse = self.get_json(&url, &params).await?;
        let current = response.current.ok_or_else(|| {
            OpenMeteoError::ParseError("No current weather data in response".to_string())
        })?;

        Ok(NormalizedReading {
            temperature_c: current.temperature_2m,
            humidity_pct: current.relative_humidity_2m,
            wind_speed_kmh: current.wind_speed_10m,
            wind_direction_deg: current.wind_direction_10m,
            precipitation_mm: current.precipitation,
            pressure_hpa: current.pressure_msl,
            observed_at: Some(self.to_utc(&current.time)?),
        })
    }

    /// Next hourly points starting at the current hour
    ///
    /// Falls back to the first points returned when no entry is at or after
    /// `now`.
    #[instrument(skip(self, location), fields(location = %location))]
    pub async fn get_hourly_forecast(
        &self,
        location: &GeoLocation,
        now: DateTime<Utc>,
    ) -> Result<Vec<ForecastPoint>, OpenMeteoError> {
        let url = format!("{}/forecast", self.config.forecast_base_url);
        let params = [
            ("latitude", location.latitude().to_string()),
            ("longitude", location.longitude().to_string()),
            ("hourly", HOURLY_VARIABLES.to_string()),
            ("forecast_days", self.config.forecast_days.to_string()),
            ("timezone", self.config.timezone.clone()),
        ];

        let response: ForecastResponse = self.get_json(&url, &params).await?;
        let hourly = response.hourly.ok_or_else(|| {
            OpenMeteoError::ParseError("No hourly forecast data in response".to_string())
        })?;

        let points = self.parse_hourly(&hourly)?;
        debug!(points = points.len(), "Parsed hourly forecast");
        Ok(select_window(points, now))
    }

    /// Pollen concentrations per species
    ///
    /// A species whose series is empty or entirely `null` is left out.
    #[instrument(skip(self, location), fields(location = %location))]
    pub async fn get_pollen(&self, location: &GeoLocation) -> Result<PollenReport, OpenMeteoError> {
        let url = format!("{}/air-quality", self.config.air_quality_base_url);
        let params = [
            ("latitude", location.latitude().to_string()),
            ("longitude", location.longitude().to_string()),
            ("hourly", POLLEN_VARIABLES.to_string()),
            ("forecast_days", self.config.pollen_forecast_days.to_string()),
            ("timezone", self.config.timezone.clone()),
        ];

        let response: AirQualityResponse = self.get_json(&url, &params).await?;
        let Some(hourly) = response.hourly else {
            return Ok(PollenReport::default());
        };
        Ok(parse_pollen(&hourly))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, OpenMeteoError> {
        debug!(url = %url, "Requesting Open-Meteo");

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OpenMeteoError::Timeout {
                        timeout_secs: self.config.timeout_secs,
                    }
                } else {
                    OpenMeteoError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(OpenMeteoError::RateLimitExceeded);
        }
        if status.is_server_error() {
            return Err(OpenMeteoError::ServiceUnavailable(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(OpenMeteoError::RequestFailed(format!("HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| OpenMeteoError::ParseError(e.to_string()))
    }

    fn parse_hourly(&self, hourly: &HourlyBlock) -> Result<Vec<ForecastPoint>, OpenMeteoError> {
        hourly
            .time
            .iter()
            .enumerate()
            .map(|(i, time)| {
                Ok(ForecastPoint {
                    at: self.to_utc(time)?,
                    temperature_c: at(&hourly.temperature_2m, i),
                    precipitation_mm: at(&hourly.precipitation, i),
                    precipitation_probability_pct: at(&hourly.precipitation_probability, i),
                    wind_speed_kmh: at(&hourly.wind_speed_10m, i),
                    wind_direction_deg: at(&hourly.wind_direction_10m, i),
                    condition: at(&hourly.weather_code, i)
                        .map_or(WeatherCondition::PartlyCloudy, WeatherCondition::from_wmo_code),
                })
            })
            .collect()
    }

    /// Interpret an API local time in the configured zone
    fn to_utc(&self, local: &str) -> Result<DateTime<Utc>, OpenMeteoError> {
        let naive = parse_local(local)?;
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| OpenMeteoError::ParseError(format!("Nonexistent local time: {local}")))
    }
}

fn parse_local(s: &str) -> Result<NaiveDateTime, OpenMeteoError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| OpenMeteoError::ParseError(format!("Invalid datetime format: {s}")))
}

/// Up to [`HOURLY_WINDOW`] points starting at the hour containing `now`
fn select_window(points: Vec<ForecastPoint>, now: DateTime<Utc>) -> Vec<ForecastPoint> {
    let hour = now.duration_trunc(TimeDelta::hours(1)).unwrap_or(now);
    let start = points.iter().position(|p| p.at >= hour).unwrap_or(0);
    points.into_iter().skip(start).take(HOURLY_WINDOW).collect()
}

fn parse_pollen(hourly: &PollenHourly) -> PollenReport {
    let observed_at = hourly.time.first().and_then(|t| parse_local(t).ok());
    let series = [
        (PollenSpecies::Alder, &hourly.alder_pollen),
        (PollenSpecies::Birch, &hourly.birch_pollen),
        (PollenSpecies::Grass, &hourly.grass_pollen),
        (PollenSpecies::Mugwort, &hourly.mugwort_pollen),
        (PollenSpecies::Ambrosia, &hourly.ragweed_pollen),
    ];

    let mut report = PollenReport::default();
    for (species, values) in series {
        if values.iter().all(Option::is_none) {
            continue;
        }
        let current = values.first().copied().flatten().unwrap_or(0.0);
        let forecast = values
            .iter()
            .take(HOURLY_WINDOW)
            .map(|v| v.unwrap_or(0.0))
            .collect();
        debug!(species = %species, current, "Parsed pollen series");
        report.insert(
            species,
            PollenMeasurement::from_concentration(current, forecast, observed_at),
        );
    }
    report
}
