//! Station directory export

use std::path::Path;

use anyhow::Context;
use integration_meteoswiss::{StationDirectory, StationIndex, stations_geojson};
use serde_json::Value;
use tracing::info;

/// FeatureCollection of every station, or of one region's stations
fn region_geojson(index: &StationIndex, region: Option<&str>) -> Value {
    match region {
        Some(region) => stations_geojson(index.list_by_region(region)),
        None => index.to_geojson(),
    }
}

/// Write the station directory to `path` as GeoJSON
pub async fn export_stations(
    directory: &StationDirectory,
    region: Option<&str>,
    path: &Path,
) -> anyhow::Result<usize> {
    let index = directory
        .load()
        .await
        .context("Failed to load station directory")?;
    let document = region_geojson(&index, region);
    let count = document["features"].as_array().map_or(0, Vec::len);

    let body = serde_json::to_string_pretty(&document)?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(stations = count, region = ?region, path = %path.display(), "Station directory exported");
    Ok(count)
}
