//! Open-Meteo configuration

use serde::{Deserialize, Serialize};

/// Configuration for the Open-Meteo forecast and air-quality APIs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenMeteoConfig {
    /// Forecast API base URL
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,

    /// Air-quality API base URL
    #[serde(default = "default_air_quality_base_url")]
    pub air_quality_base_url: String,

    /// IANA zone the API reports local times in
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Days of hourly forecast to request
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,

    /// Days of pollen forecast to request
    #[serde(default = "default_pollen_forecast_days")]
    pub pollen_forecast_days: u8,
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_air_quality_base_url() -> String {
    "https://air-quality-api.open-meteo.com/v1".to_string()
}

fn default_timezone() -> String {
    "Europe/Zurich".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_forecast_days() -> u8 {
    2
}

const fn default_pollen_forecast_days() -> u8 {
    5
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            forecast_base_url: default_forecast_base_url(),
            air_quality_base_url: default_air_quality_base_url(),
            timezone: default_timezone(),
            timeout_secs: default_timeout_secs(),
            forecast_days: default_forecast_days(),
            pollen_forecast_days: default_pollen_forecast_days(),
        }
    }
}
