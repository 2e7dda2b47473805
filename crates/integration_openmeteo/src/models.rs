//! Open-Meteo response models
//!
//! Every variable is optional; the API drops unknown variables silently and
//! returns `null` for hours without data.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    #[serde(default)]
    pub current: Option<CurrentBlock>,
    #[serde(default)]
    pub hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentBlock {
    pub time: String,
    #[serde(default)]
    pub temperature_2m: Option<f64>,
    #[serde(default)]
    pub relative_humidity_2m: Option<f64>,
    #[serde(default)]
    pub pressure_msl: Option<f64>,
    #[serde(default)]
    pub wind_speed_10m: Option<f64>,
    #[serde(default)]
    pub wind_direction_10m: Option<f64>,
    #[serde(default)]
    pub precipitation: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HourlyBlock {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    pub weather_code: Vec<Option<u16>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_direction_10m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AirQualityResponse {
    #[serde(default)]
    pub hourly: Option<PollenHourly>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PollenHourly {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub alder_pollen: Vec<Option<f64>>,
    #[serde(default)]
    pub birch_pollen: Vec<Option<f64>>,
    #[serde(default)]
    pub grass_pollen: Vec<Option<f64>>,
    #[serde(default)]
    pub mugwort_pollen: Vec<Option<f64>>,
    #[serde(default)]
    pub ragweed_pollen: Vec<Option<f64>>,
}

/// Value at `index` of a parallel series, absent when short or null
pub(crate) fn at<T: Copy>(series: &[Option<T>], index: usize) -> Option<T> {
    series.get(index).copied().flatten()
}
