//! Station directory
//!
//! Indexes the station metadata feed by canonical id and answers
//! region and nearest-station lookups.

use std::collections::HashMap;
use std::sync::Arc;

use domain::{GeoLocation, Station, StationId};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::client::MeteoSwissClient;
use crate::csv::{CsvRow, CsvTable};
use crate::error::MeteoSwissError;

const ID_COLUMNS: &[&str] = &["station_abbr", "station_id", "id"];
const NAME_COLUMNS: &[&str] = &["station_name", "name"];
const REGION_COLUMNS: &[&str] = &["station_canton", "canton", "region"];
const ALTITUDE_COLUMNS: &[&str] = &["station_height_masl", "altitude"];
const LAT_COLUMNS: &[&str] = &["station_coordinates_wgs84_lat", "latitude", "lat"];
const LON_COLUMNS: &[&str] = &["station_coordinates_wgs84_lon", "longitude", "lon"];

const METADATA_VERSION: &str = "ogd-smn/meta-stations";

/// Immutable set of stations loaded from one metadata snapshot
#[derive(Debug, Clone, Default)]
pub struct StationIndex {
    stations: Vec<Station>,
    by_id: HashMap<StationId, usize>,
}

impl StationIndex {
    /// Build an index from a parsed metadata table
    ///
    /// Rows without a valid id or coordinates are dropped. The first row
    /// wins when an id repeats.
    ///
    /// # Errors
    ///
    /// Returns [`MeteoSwissError::SchemaDrift`] when the id or coordinate
    /// columns are missing from the header.
    pub fn from_table(table: &CsvTable) -> Result<Self, MeteoSwissError> {
        let missing: Vec<String> = [ID_COLUMNS, LAT_COLUMNS, LON_COLUMNS]
            .iter()
            .filter(|aliases| !aliases.iter().any(|a| table.has_column(a)))
            .map(|aliases| aliases[0].to_string())
            .collect();
        if !missing.is_empty() {
            return Err(MeteoSwissError::SchemaDrift {
                version: METADATA_VERSION.to_string(),
                missing,
            });
        }

        let mut index = Self::default();
        let mut dropped = 0usize;
        for row in &table.rows {
            match station_from_row(row) {
                Some(station) if !index.by_id.contains_key(&station.id) => {
                    index.by_id.insert(station.id.clone(), index.stations.len());
                    index.stations.push(station);
                },
                Some(station) => debug!(station = %station.id, "Duplicate station id ignored"),
                None => dropped += 1,
            }
        }

        debug!(
            stations = index.stations.len(),
            dropped, "Indexed station metadata"
        );
        Ok(index)
    }

    /// Decode and index a raw metadata file
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails or the header drifted.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MeteoSwissError> {
        Self::from_table(&CsvTable::from_bytes(bytes)?)
    }

    /// Station by id, case-insensitive
    pub fn get(&self, id: &str) -> Option<&Station> {
        let id = StationId::new(id).ok()?;
        self.by_id.get(&id).map(|&i| &self.stations[i])
    }

    /// All stations in feed order
    pub fn list_all(&self) -> &[Station] {
        &self.stations
    }

    /// Stations whose region code matches, case-insensitive
    pub fn list_by_region(&self, region: &str) -> Vec<&Station> {
        self.stations.iter().filter(|s| s.in_region(region)).collect()
    }

    /// Up to `limit` stations within `max_distance_km`, closest first
    pub fn nearest(
        &self,
        location: &GeoLocation,
        max_distance_km: f64,
        limit: usize,
    ) -> Vec<(&Station, f64)> {
        let mut hits: Vec<(&Station, f64)> = self
            .stations
            .iter()
            .map(|s| (s, s.distance_to(location)))
            .filter(|(_, d)| *d <= max_distance_km)
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.truncate(limit);
        hits
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// GeoJSON FeatureCollection of every station
    pub fn to_geojson(&self) -> Value {
        stations_geojson(&self.stations)
    }
}

/// GeoJSON FeatureCollection of `stations`, one Point feature each
pub fn stations_geojson<'a>(stations: impl IntoIterator<Item = &'a Station>) -> Value {
    let features: Vec<Value> = stations
        .into_iter()
        .map(|s| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [s.location.longitude(), s.location.latitude()],
                },
                "properties": {
                    "id": s.id.as_str(),
                    "name": s.name,
                    "region": s.region,
                    "altitude": s.altitude_m,
                },
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

fn station_from_row(row: &CsvRow) -> Option<Station> {
    let id = StationId::new(row.first_of(ID_COLUMNS)?).ok()?;
    let latitude = row.first_of(LAT_COLUMNS).and_then(crate::csv::parse_number)?;
    let longitude = row.first_of(LON_COLUMNS).and_then(crate::csv::parse_number)?;
    let location = GeoLocation::new(latitude, longitude).ok()?;

    Some(Station {
        name: row
            .first_of(NAME_COLUMNS)
            .map_or_else(|| id.as_str().to_uppercase(), str::to_string),
        id,
        location,
        altitude_m: row.first_of(ALTITUDE_COLUMNS).and_then(crate::csv::parse_number),
        region: row.first_of(REGION_COLUMNS).map(str::to_string),
    })
}

/// Lazily loaded station index
///
/// The metadata feed is fetched once and kept for the lifetime of the
/// directory; [`StationDirectory::reload`] fetches it again.
#[derive(Debug)]
pub struct StationDirectory {
    client: Arc<MeteoSwissClient>,
    index: Mutex<Option<Arc<StationIndex>>>,
}

impl StationDirectory {
    pub fn new(client: Arc<MeteoSwissClient>) -> Self {
        Self {
            client,
            index: Mutex::new(None),
        }
    }

    /// Loaded index, fetching it on first use
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata feed cannot be fetched or parsed.
    pub async fn load(&self) -> Result<Arc<StationIndex>, MeteoSwissError> {
        let mut guard = self.index.lock().await;
        if let Some(index) = guard.as_ref() {
            return Ok(Arc::clone(index));
        }
        let index = Arc::new(self.client.get_station_index().await?);
        *guard = Some(Arc::clone(&index));
        Ok(index)
    }

    /// Fetch the metadata feed again and replace the index
    ///
    /// On failure the previously loaded index stays in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata feed cannot be fetched or parsed.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> Result<Arc<StationIndex>, MeteoSwissError> {
        let index = Arc::new(self.client.get_station_index().await?);
        info!(stations = index.len(), "Station directory reloaded");
        *self.index.lock().await = Some(Arc::clone(&index));
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = "station_abbr;station_name;station_canton;station_height_masl;station_coordinates_lv95_east;station_coordinates_lv95_north;station_coordinates_wgs84_lat;station_coordinates_wgs84_lon\n\
        SMA;Zürich / Fluntern;ZH;556;2685089;1248065;47.377925;8.565742\n\
        KLO;Zürich / Kloten;ZH;426;2682706;1259337;47.479558;8.535998\n\
        BER;Bern / Zollikofen;BE;553;2601929;1204409;46.990744;7.464061\n\
        GVE;Genève / Cointrin;GE;411;2498904;1122632;46.247519;6.127742\n\
        XXX;No coordinates;ZH;500;;;;\n\
        sma;Duplicate;ZH;1;0;0;47.0;8.0\n";

    fn index() -> StationIndex {
        StationIndex::from_table(&CsvTable::parse(FEED)).unwrap()
    }

    #[test]
    fn test_rows_without_coordinates_are_dropped() {
        let index = index();
        assert_eq!(index.len(), 4);
        assert!(index.get("xxx").is_none());
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_first_wins() {
        let index = index();
        let station = index.get("SMA").unwrap();
        assert_eq!(station.name, "Zürich / Fluntern");
        assert_eq!(station.altitude_m, Some(556.0));
        assert_eq!(station.region.as_deref(), Some("ZH"));
        assert_eq!(index.get(" sma ").unwrap().id.as_str(), "sma");
    }

    #[test]
    fn test_list_by_region() {
        let index = index();
        let zh: Vec<&str> = index
            .list_by_region("zh")
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(zh, vec!["sma", "klo"]);
        assert!(index.list_by_region("TI").is_empty());
    }

    #[test]
    fn test_nearest_sorted_and_limited() {
        let index = index();
        let zurich_hb = GeoLocation::new(47.3779, 8.5403).unwrap();

        let hits = index.nearest(&zurich_hb, 50.0, 5);
        let ids: Vec<&str> = hits.iter().map(|(s, _)| s.id.as_str()).collect();
        assert_eq!(ids, vec!["sma", "klo"]);
        assert!(hits[0].1 < hits[1].1);

        let one = index.nearest(&zurich_hb, 500.0, 1);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].0.id.as_str(), "sma");

        assert_eq!(index.nearest(&zurich_hb, 500.0, 10).len(), 4);
    }

    #[test]
    fn test_nearest_self_distance_is_zero() {
        let index = index();
        let bern = index.get("ber").unwrap().location;
        let hits = index.nearest(&bern, 1.0, 1);
        assert_eq!(hits[0].0.id.as_str(), "ber");
        assert!(hits[0].1.abs() < 1e-9);
    }

    #[test]
    fn test_missing_coordinate_columns_report_drift() {
        let table = CsvTable::parse("station_abbr;station_name\nSMA;Zürich\n");
        match StationIndex::from_table(&table) {
            Err(MeteoSwissError::SchemaDrift { missing, .. }) => {
                assert_eq!(
                    missing,
                    vec!["station_coordinates_wgs84_lat", "station_coordinates_wgs84_lon"]
                );
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_aliased_headers() {
        let table = CsvTable::parse("id;name;lat;lon\nabc;Test;46.5;7.5\n");
        let index = StationIndex::from_table(&table).unwrap();
        let station = index.get("abc").unwrap();
        assert_eq!(station.name, "Test");
        assert!(station.region.is_none());
    }

    #[test]
    fn test_geojson_export() {
        let geojson = index().to_geojson();
        assert_eq!(geojson["type"], "FeatureCollection");
        let features = geojson["features"].as_array().unwrap();
        assert_eq!(features.len(), 4);
        assert_eq!(features[0]["properties"]["id"], "sma");
        assert_eq!(features[0]["geometry"]["coordinates"][0], 8.565742);
        assert_eq!(features[0]["geometry"]["coordinates"][1], 47.377925);
    }

    #[test]
    fn test_region_geojson_export() {
        let index = index();
        let geojson = stations_geojson(index.list_by_region("zh"));
        let features = geojson["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert!(features.iter().all(|f| f["properties"]["region"] == "ZH"));
    }
}
