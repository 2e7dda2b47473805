//! Application configuration
//!
//! Split into focused sub-modules:
//! - `location`: monitored locations and their source selection
//! - `cache`: cache TTLs per data kind
//!
//! Upstream client settings live with their integration crates, the retry
//! policy in [`crate::retry`] and log settings in [`crate::telemetry`].

mod cache;
mod location;

use std::collections::HashSet;
use std::path::Path;

use chrono_tz::Tz;
use integration_meteoswiss::MeteoSwissConfig;
use integration_openmeteo::OpenMeteoConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::retry::RetryConfig;
use crate::telemetry::TelemetryConfig;

pub use cache::CacheConfig;
pub use location::{CurrentSource, LocationConfig, PollenMode};

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "meteobridge";

/// Prefix of environment overrides (e.g. `METEOBRIDGE_RETRY__MAX_ATTEMPTS`)
pub const ENV_PREFIX: &str = "METEOBRIDGE";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Monitored locations
    #[serde(default)]
    pub locations: Vec<LocationConfig>,

    /// National station network endpoints and parameter table
    #[serde(default)]
    pub meteoswiss: MeteoSwissConfig,

    /// Open weather and air-quality API endpoints
    #[serde(default)]
    pub openmeteo: OpenMeteoConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// IANA zone for local-time conversions
    ///
    /// Applied to both upstream clients; their own `timezone` keys are
    /// ignored.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "Europe/Zurich".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            meteoswiss: MeteoSwissConfig::default(),
            openmeteo: OpenMeteoConfig::default(),
            retry: RetryConfig::default(),
            cache: CacheConfig::default(),
            telemetry: TelemetryConfig::default(),
            timezone: default_timezone(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// Sources, later ones winning: built-in defaults, the TOML file at
    /// `path` (or an optional `meteobridge.toml` in the working directory),
    /// then `METEOBRIDGE_*` environment variables with `__` between nested
    /// keys.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = config::Config::builder()
            // Start with defaults
            .set_default("timezone", default_timezone())?
            // Load from file if exists
            .add_source(file)
            // Override with environment variables (e.g., METEOBRIDGE_TELEMETRY__JSON)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        debug!(locations = config.locations.len(), "Configuration loaded");
        Ok(config)
    }

    /// Parsed [`AppConfig::timezone`]
    pub fn tz(&self) -> Result<Tz, config::ConfigError> {
        self.timezone.parse::<Tz>().map_err(|_| {
            config::ConfigError::Message(format!("Unknown timezone: {}", self.timezone))
        })
    }

    /// MeteoSwiss client settings with [`AppConfig::timezone`] applied
    #[must_use]
    pub fn meteoswiss_client(&self) -> MeteoSwissConfig {
        MeteoSwissConfig {
            timezone: self.timezone.clone(),
            ..self.meteoswiss.clone()
        }
    }

    /// Open-Meteo client settings with [`AppConfig::timezone`] applied
    #[must_use]
    pub fn openmeteo_client(&self) -> OpenMeteoConfig {
        OpenMeteoConfig {
            timezone: self.timezone.clone(),
            ..self.openmeteo.clone()
        }
    }

    /// Check every location and global setting
    ///
    /// All problems are collected into one error message, one per line.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let mut problems = Vec::new();

        if self.locations.is_empty() {
            problems.push("no locations configured".to_string());
        }

        let mut names = HashSet::new();
        for location in &self.locations {
            if !names.insert(location.name.as_str()) {
                problems.push(format!("duplicate location name '{}'", location.name));
            }
            problems.extend(location.problems());
        }

        if let Err(e) = self.tz() {
            problems.push(e.to_string());
        }
        if self.retry.max_attempts == 0 {
            problems.push("retry.max_attempts must be at least 1".to_string());
        }
        if self.meteoswiss.parameters.min_present == 0 {
            problems.push("meteoswiss.parameters.min_present must be at least 1".to_string());
        }

        if problems.is_empty() {
            info!(locations = self.locations.len(), "Configuration validated");
            Ok(())
        } else {
            Err(config::ConfigError::Message(problems.join("\n")))
        }
    }
}
