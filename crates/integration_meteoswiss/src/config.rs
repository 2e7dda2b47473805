//! MeteoSwiss configuration

use serde::{Deserialize, Serialize};

use crate::parameters::ParameterTable;

/// Configuration for the MeteoSwiss data services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeteoSwissConfig {
    /// STAC catalog API base URL used for asset discovery
    #[serde(default = "default_stac_base_url")]
    pub stac_base_url: String,

    /// STAC collection holding the automatic station network
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Base URL of the static data files (`{base}/{station}/...`)
    #[serde(default = "default_data_base_url")]
    pub data_base_url: String,

    /// Station metadata CSV
    #[serde(default = "default_stations_url")]
    pub stations_url: String,

    /// Region detail endpoint of the app API
    #[serde(default = "default_app_api_url")]
    pub app_api_url: String,

    /// Pollen page URL template with `{species}` and `{postal_code}` placeholders
    #[serde(default = "default_pollen_page_url")]
    pub pollen_page_url: String,

    /// IANA zone used for day boundaries and warning validity times
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Parameter identifiers of the station readings feed
    #[serde(default)]
    pub parameters: ParameterTable,
}

fn default_stac_base_url() -> String {
    "https://data.geo.admin.ch/api/stac/v1".to_string()
}

fn default_collection() -> String {
    "ch.meteoschweiz.ogd-smn".to_string()
}

fn default_data_base_url() -> String {
    "https://data.geo.admin.ch/ch.meteoschweiz.ogd-smn".to_string()
}

fn default_stations_url() -> String {
    "https://data.geo.admin.ch/ch.meteoschweiz.ogd-smn/ogd-smn_meta_stations.csv".to_string()
}

fn default_app_api_url() -> String {
    "https://app-prod-ws.meteoswiss-app.ch/v1/plzDetail".to_string()
}

fn default_pollen_page_url() -> String {
    "https://www.meteoswiss.admin.ch/services-and-publications/applications/pollen/{species}.html?plz={postal_code}"
        .to_string()
}

fn default_timezone() -> String {
    "Europe/Zurich".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for MeteoSwissConfig {
    fn default() -> Self {
        Self {
            stac_base_url: default_stac_base_url(),
            collection: default_collection(),
            data_base_url: default_data_base_url(),
            stations_url: default_stations_url(),
            app_api_url: default_app_api_url(),
            pollen_page_url: default_pollen_page_url(),
            timezone: default_timezone(),
            timeout_secs: default_timeout_secs(),
            parameters: ParameterTable::default(),
        }
    }
}

impl MeteoSwissConfig {
    /// Asset file name prefix derived from the collection id (`ogd-smn`)
    pub fn asset_prefix(&self) -> &str {
        self.collection
            .rsplit('.')
            .next()
            .unwrap_or(self.collection.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = MeteoSwissConfig::default();
        assert_eq!(config.stac_base_url, "https://data.geo.admin.ch/api/stac/v1");
        assert_eq!(config.collection, "ch.meteoschweiz.ogd-smn");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.timezone, "Europe/Zurich");
        assert!(config.pollen_page_url.contains("{species}"));
        assert_eq!(config.parameters.version, "ogd-smn/v1");
    }

    #[test]
    fn test_asset_prefix() {
        let config = MeteoSwissConfig::default();
        assert_eq!(config.asset_prefix(), "ogd-smn");

        let custom = MeteoSwissConfig {
            collection: "flat".to_string(),
            ..Default::default()
        };
        assert_eq!(custom.asset_prefix(), "flat");
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: MeteoSwissConfig =
            serde_json::from_str(r#"{"timeout_secs":10,"parameters":{"temperature":"tre200sx"}}"#)
                .unwrap();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.parameters.temperature, "tre200sx");
        assert_eq!(config.parameters.humidity, "ure200s0");
        assert_eq!(config.app_api_url, "https://app-prod-ws.meteoswiss-app.ch/v1/plzDetail");
    }
}
