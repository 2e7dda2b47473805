//! meteobridge daemon
//!
//! Polls every configured location and logs each published snapshot.

mod export;
mod sink;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use application::SnapshotSink;
use clap::Parser;
use infrastructure::{AppConfig, LocationRuntime, Services, init_telemetry};
use tokio::signal;
use tracing::{error, info};

use crate::sink::LoggingSink;

/// Weather polling daemon
#[derive(Parser)]
#[command(name = "meteobridge")]
#[command(author, version, about = "MeteoSwiss polling and normalization daemon", long_about = None)]
struct Cli {
    /// Config file (defaults to ./meteobridge.toml when present)
    #[arg(short, long, env = "METEOBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Verbosity level, overrides the configured log filter
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,

    /// Write the station directory as GeoJSON to this file and exit
    #[arg(long, value_name = "PATH")]
    export_stations: Option<PathBuf>,

    /// Only export stations of this region (canton code)
    #[arg(long, requires = "export_stations")]
    region: Option<String>,
}

/// Determine log filter from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(filter) = log_filter_from_verbosity(cli.verbose) {
        config.telemetry.log_filter = filter.to_string();
    }
    init_telemetry(&config.telemetry)?;

    // Coordinators only wait on I/O
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    if let Some(path) = cli.export_stations {
        let services = Services::from_config(&config)?;
        runtime.block_on(export::export_stations(
            &services.directory,
            cli.region.as_deref(),
            &path,
        ))?;
        return Ok(());
    }

    config.validate().context("Invalid configuration")?;
    if cli.check {
        info!(locations = config.locations.len(), "Configuration is valid");
        return Ok(());
    }

    runtime.block_on(run(config))
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!("meteobridge v{} starting", env!("CARGO_PKG_VERSION"));

    let tz = config.tz()?;
    let services = Services::from_config(&config)?;
    let sink: Arc<dyn SnapshotSink> = Arc::new(LoggingSink::new(tz));

    let mut runtimes = Vec::with_capacity(config.locations.len());
    for location in &config.locations {
        match LocationRuntime::start(location, &services, Arc::clone(&sink)) {
            Ok(runtime) => runtimes.push(runtime),
            Err(e) => error!(location = %location.name, error = %e, "Location not started"),
        }
    }
    if runtimes.is_empty() {
        anyhow::bail!("No location could be started");
    }
    let sweeper = services.cache.spawn_sweeper(config.cache.sweep_interval());

    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
    }
    info!("Received Ctrl+C, shutting down");

    sweeper.abort();

    for runtime in runtimes {
        runtime.shutdown().await;
    }
    for (name, stats) in services.cache.stats() {
        info!(
            cache = name,
            hits = stats.hits,
            misses = stats.misses,
            evictions = stats.evictions,
            hit_rate = stats.hit_rate(),
            "Cache statistics"
        );
    }
    info!("Shutdown complete");
    Ok(())
}
