//! Logging initialization
//!
//! Installs a `tracing-subscriber` registry with an [`EnvFilter`] and either
//! the human-readable or the JSON fmt layer.

use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for log output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g., "info", "debug", "meteobridge=debug,infrastructure=info")
    ///
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Emit one JSON object per event instead of formatted lines
    #[serde(default)]
    pub json: bool,
}

/// Workspace crates log at `info`, everything else at `warn`
fn default_log_filter() -> String {
    [
        "warn",
        "meteobridge=info",
        "infrastructure=info",
        "application=info",
        "domain=info",
        "integration_meteoswiss=info",
        "integration_openmeteo=info",
    ]
    .join(",")
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json: false,
        }
    }
}

/// Error type for telemetry initialization
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured filter directives
    #[error("Invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    /// Failed to install the global subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

/// Filter from `RUST_LOG`, falling back to the configured directives
fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.log_filter).map_err(|e| TelemetryError::Filter {
        filter: config.log_filter.clone(),
        reason: e.to_string(),
    })
}

/// Install the global tracing subscriber
///
/// Can only succeed once per process; a second call returns
/// [`TelemetryError::Init`].
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(config)?;

    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true),
            )
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    }

    info!(filter = %config.log_filter, json = config.json, "Logging initialized");
    Ok(())
}
