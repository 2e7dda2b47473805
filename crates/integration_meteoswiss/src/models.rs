//! MeteoSwiss JSON response models

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// STAC item describing one station's data files
#[derive(Debug, Deserialize)]
pub(crate) struct StacItem {
    #[serde(default)]
    pub assets: HashMap<String, StacAsset>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StacAsset {
    pub href: String,
}

/// Split the `warnings` field into individual warnings
///
/// The API sends one object, a list of objects, an empty object or null.
/// Entries that do not parse are logged and skipped.
pub(crate) fn parse_warnings(value: Option<Value>) -> Vec<RawWarning> {
    let items = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(Value::Object(map)) if map.is_empty() => return Vec::new(),
        Some(object @ Value::Object(_)) => vec![object],
        Some(other) => {
            warn!(value = %other, "Unexpected warnings field");
            return Vec::new();
        },
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawWarning>(item) {
            Ok(warning) => Some(warning),
            Err(e) => {
                warn!(error = %e, "Skipping malformed warning");
                None
            },
        })
        .collect()
}

/// Region detail document (`plzDetail`)
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RegionDetail {
    #[serde(default)]
    pub warnings: Option<Value>,
    #[serde(default)]
    pub graph: Option<Graph>,
    #[serde(default)]
    pub forecast: Vec<DayForecast>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawWarning {
    #[serde(default)]
    pub warn_type: u16,
    #[serde(default)]
    pub warn_level: u8,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub html_text: Option<String>,
    /// Unix milliseconds
    #[serde(default)]
    pub valid_from: Option<i64>,
    /// Unix milliseconds
    #[serde(default)]
    pub valid_to: Option<i64>,
    #[serde(default)]
    pub outlook: bool,
}

/// Three-hourly forecast series
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Graph {
    /// Unix milliseconds of the first slot
    pub start: i64,
    #[serde(default)]
    pub weather_icon3h: Vec<Option<u16>>,
    #[serde(default)]
    pub temperature_mean3h: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation3h: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability3h: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed3h: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_direction3h: Vec<Option<f64>>,
}

impl Graph {
    pub fn slots(&self) -> usize {
        self.weather_icon3h.len().max(self.temperature_mean3h.len())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DayForecast {
    /// Local calendar date, `YYYY-MM-DD`
    pub day_date: String,
    #[serde(default)]
    pub icon_day: Option<u16>,
    #[serde(default)]
    pub temperature_max: Option<f64>,
    #[serde(default)]
    pub temperature_min: Option<f64>,
    #[serde(default)]
    pub precipitation: Option<f64>,
}

/// Value at `index` of a parallel series, absent when short or null
pub(crate) fn at<T: Copy>(series: &[Option<T>], index: usize) -> Option<T> {
    series.get(index).copied().flatten()
}
