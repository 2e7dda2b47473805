//! Integration tests for the MeteoSwiss client using wiremock
//!
//! These tests run the full fetch, decode and normalize path against a
//! mock HTTP server.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use domain::{
    AlertCategory, PollenLevel, PollenSpecies, RegionCode, StationId, WeatherCondition,
};
use integration_meteoswiss::{
    MeteoSwissClient, MeteoSwissConfig, MeteoSwissError, STATION_FEED_ROWS, StationDirectory,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const READINGS_HEADER: &str =
    "station_abbr;reference_timestamp;tre200s0;ure200s0;fu3010z0;dkl010z0;prestas0;rre150z0";

fn create_test_client(mock_server: &MockServer) -> MeteoSwissClient {
    let config = MeteoSwissConfig {
        stac_base_url: mock_server.uri(),
        data_base_url: format!("{}/data", mock_server.uri()),
        stations_url: format!("{}/data/ogd-smn_meta_stations.csv", mock_server.uri()),
        app_api_url: format!("{}/v1/plzDetail", mock_server.uri()),
        pollen_page_url: format!("{}/pollen/{{species}}.html?plz={{postal_code}}", mock_server.uri()),
        timeout_secs: 5,
        ..Default::default()
    };
    #[allow(clippy::expect_used)]
    MeteoSwissClient::new(config).expect("Failed to create client")
}

fn station() -> StationId {
    StationId::new("SMA").unwrap()
}

fn region() -> RegionCode {
    RegionCode::new("8001").unwrap()
}

/// Readings file in the feed's legacy encoding
fn readings_csv(rows: &[&str]) -> Vec<u8> {
    let mut text = READINGS_HEADER.to_string();
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(&text);
    bytes.into_owned()
}

fn filler_rows(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("SMA;01.07.2025 {:02}:{:02};18.0;60.0;5.0;200;960.0;0.0", i / 6, (i % 6) * 10))
        .collect()
}

async fn mount_stac_item(mock_server: &MockServer, assets: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/collections/ch.meteoschweiz.ogd-smn/items/sma"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "sma",
            "assets": assets,
        })))
        .mount(mock_server)
        .await;
}

// ============================================================================
// Asset discovery and readings
// ============================================================================

#[tokio::test]
async fn test_latest_reading_via_now_asset() {
    let mock_server = MockServer::start().await;
    let now_href = format!("{}/data/sma/ogd-smn_sma_t_now.csv", mock_server.uri());
    mount_stac_item(
        &mock_server,
        serde_json::json!({
            "ogd-smn_sma_t_now.csv": { "href": now_href },
            "ogd-smn_sma_t_recent.csv": { "href": "http://unused.invalid/recent.csv" },
        }),
    )
    .await;

    let mut rows = filler_rows(12);
    rows.push("SMA;01.07.2025 02:00;21.5;52.0;9.0;270;959.5;0.2".to_string());
    rows.push("SMA;01.07.2025 02:10;;;;;;".to_string());
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();

    Mock::given(method("GET"))
        .and(path("/data/sma/ogd-smn_sma_t_now.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(readings_csv(&rows)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let reading = client.get_latest_reading(&station()).await.unwrap();

    assert_eq!(reading.temperature_c, Some(21.5));
    assert_eq!(reading.humidity_pct, Some(52.0));
    assert_eq!(reading.wind_speed_kmh, Some(9.0));
    assert_eq!(reading.wind_direction_deg, Some(270.0));
    assert_eq!(reading.pressure_hpa, Some(959.5));
    assert_eq!(reading.precipitation_mm, Some(0.2));
    assert_eq!(
        reading.observed_at,
        Some(Utc.with_ymd_and_hms(2025, 7, 1, 2, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn test_discovery_falls_back_to_recent_asset() {
    let mock_server = MockServer::start().await;
    let recent_href = format!("{}/data/sma/ogd-smn_sma_t_recent.csv", mock_server.uri());
    mount_stac_item(
        &mock_server,
        serde_json::json!({ "ogd-smn_sma_t_recent.csv": { "href": recent_href } }),
    )
    .await;

    let client = create_test_client(&mock_server);
    let url = client.discover_readings_url(&station()).await.unwrap();
    assert!(url.ends_with("ogd-smn_sma_t_recent.csv"));
}

#[tokio::test]
async fn test_discovery_without_assets_is_not_found() {
    let mock_server = MockServer::start().await;
    mount_stac_item(&mock_server, serde_json::json!({})).await;

    let client = create_test_client(&mock_server);
    let err = client.get_latest_reading(&station()).await.unwrap_err();
    assert!(matches!(err, MeteoSwissError::NotFound(_)));
}

#[tokio::test]
async fn test_all_absent_row_is_schema_mismatch() {
    let mock_server = MockServer::start().await;
    let now_href = format!("{}/data/sma/ogd-smn_sma_t_now.csv", mock_server.uri());
    mount_stac_item(
        &mock_server,
        serde_json::json!({ "ogd-smn_sma_t_now.csv": { "href": now_href } }),
    )
    .await;

    let rows: Vec<String> = (0..12)
        .map(|i| format!("SMA;01.07.2025 00:{:02};;;;;;", i * 5))
        .collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    Mock::given(method("GET"))
        .and(path("/data/sma/ogd-smn_sma_t_now.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(readings_csv(&rows)))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.get_latest_reading(&station()).await.unwrap_err();
    assert!(matches!(err, MeteoSwissError::SchemaMismatch(_)));
}

#[tokio::test]
async fn test_renamed_parameters_are_schema_drift() {
    let mock_server = MockServer::start().await;
    let now_href = format!("{}/data/sma/ogd-smn_sma_t_now.csv", mock_server.uri());
    mount_stac_item(
        &mock_server,
        serde_json::json!({ "ogd-smn_sma_t_now.csv": { "href": now_href } }),
    )
    .await;

    let mut body = String::from("station_abbr;reference_timestamp;tre200x0;ure200x0\n");
    for i in 0..12 {
        body.push_str(&format!("SMA;01.07.2025 00:{:02};20.0;50.0\n", i * 5));
    }
    Mock::given(method("GET"))
        .and(path("/data/sma/ogd-smn_sma_t_now.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    match client.get_latest_reading(&station()).await {
        Err(MeteoSwissError::SchemaDrift { version, missing }) => {
            assert_eq!(version, "ogd-smn/v1");
            assert!(missing.contains(&"tre200s0".to_string()));
        },
        other => panic!("unexpected result: {other:?}"),
    }
}

// ============================================================================
// Station feed forecast
// ============================================================================

#[tokio::test]
async fn test_station_forecast_reads_first_rows() {
    let mock_server = MockServer::start().await;
    let rows = filler_rows(40);
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    Mock::given(method("GET"))
        .and(path("/data/sma/ogd-smn_sma_t_now.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(readings_csv(&rows)))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let points = client.get_station_forecast(&station()).await.unwrap();
    assert_eq!(points.len(), STATION_FEED_ROWS);
    assert_eq!(points[0].temperature_c, Some(18.0));
    assert_eq!(points[0].condition, WeatherCondition::PartlyCloudy);
}

#[tokio::test]
async fn test_station_forecast_missing_feed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.get_station_forecast(&station()).await.unwrap_err();
    assert!(matches!(err, MeteoSwissError::NotFound(_)));
    assert!(!err.is_retryable());
}

// ============================================================================
// Station directory
// ============================================================================

#[tokio::test]
async fn test_station_directory_loads_once() {
    let mock_server = MockServer::start().await;
    let mut text = String::from(
        "station_abbr;station_name;station_canton;station_height_masl;station_coordinates_wgs84_lat;station_coordinates_wgs84_lon\n",
    );
    text.push_str("SMA;Zürich / Fluntern;ZH;556;47.377925;8.565742\n");
    text.push_str("BER;Bern / Zollikofen;BE;553;46.990744;7.464061\n");
    for i in 0..10 {
        text.push_str(&format!("X{i:02};Station {i};TI;300;46.{i}0;8.90\n"));
    }
    let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(&text);

    Mock::given(method("GET"))
        .and(path("/data/ogd-smn_meta_stations.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.into_owned()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let directory = StationDirectory::new(Arc::new(create_test_client(&mock_server)));
    let index = directory.load().await.unwrap();
    assert_eq!(index.len(), 12);
    assert_eq!(index.get("sma").unwrap().name, "Zürich / Fluntern");
    assert_eq!(index.list_by_region("TI").len(), 10);

    // Cached for the directory's lifetime
    let again = directory.load().await.unwrap();
    assert!(Arc::ptr_eq(&index, &again));

    let reloaded = directory.reload().await.unwrap();
    assert!(!Arc::ptr_eq(&index, &reloaded));
    assert_eq!(reloaded.len(), 12);
}

// ============================================================================
// Region detail: warnings and forecast
// ============================================================================

#[tokio::test]
async fn test_alerts_single_object_and_list_match() {
    let warning = serde_json::json!({
        "warnType": 1,
        "warnLevel": 3,
        "text": "Gewitter",
        "validFrom": 1_751_364_000_000_i64,
        "validTo": 1_751_407_200_000_i64,
    });

    let single_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/plzDetail"))
        .and(query_param("plz", "800100"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "warnings": warning })),
        )
        .mount(&single_server)
        .await;

    let list_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/plzDetail"))
        .and(query_param("plz", "800100"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "warnings": [warning] })),
        )
        .mount(&list_server)
        .await;

    let single = create_test_client(&single_server)
        .get_alerts(&region())
        .await
        .unwrap();
    let list = create_test_client(&list_server)
        .get_alerts(&region())
        .await
        .unwrap();

    assert_eq!(single.len(), 1);
    assert_eq!(single, list);
    assert_eq!(single[0].category, AlertCategory::Thunderstorm);
    assert_eq!(single[0].id, "8001_3_1_1751364000000");
}

#[tokio::test]
async fn test_region_forecast_from_graph() {
    let mock_server = MockServer::start().await;
    let start = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
    Mock::given(method("GET"))
        .and(path("/v1/plzDetail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "graph": {
                "start": start.timestamp_millis(),
                "weatherIcon3h": [1, 1, 5, 5, 14, 14, 1, 1, 1, 1, 1, 1],
                "temperatureMean3h": [15.0, 14.0, 17.0, 21.0, 23.0, 20.0, 17.0, 16.0, 15.0, 14.0, 18.0, 22.0],
                "precipitation3h": [0.0, 0.0, 0.0, 0.0, 1.5, 0.3, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            },
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let now = Utc.with_ymd_and_hms(2025, 7, 1, 4, 30, 0).unwrap();
    let points = client.get_region_forecast(&region(), now).await.unwrap();

    assert_eq!(points.len(), 24);
    assert_eq!(points[0].at, Utc.with_ymd_and_hms(2025, 7, 1, 4, 0, 0).unwrap());
    assert_eq!(points[0].temperature_c, Some(14.0));
    assert_eq!(points[2].temperature_c, Some(17.0));
    assert!((points[8].precipitation_mm.unwrap() - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_region_forecast_from_daily() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/plzDetail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "forecast": [
                { "dayDate": "2025-07-01", "iconDay": 1, "temperatureMin": 14.0, "temperatureMax": 26.0, "precipitation": 0.0 },
                { "dayDate": "2025-07-02", "iconDay": 14, "temperatureMin": 12.0, "temperatureMax": 18.0, "precipitation": 12.0 },
            ],
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let now = Utc.with_ymd_and_hms(2025, 7, 1, 10, 0, 0).unwrap();
    let points = client.get_region_forecast(&region(), now).await.unwrap();

    assert_eq!(points.len(), 24);
    assert_eq!(points[0].at, now);
    assert_eq!(points[0].temperature_c, Some(20.0));
    let tomorrow = points.last().unwrap();
    assert_eq!(tomorrow.temperature_c, Some(15.0));
    assert!((tomorrow.precipitation_mm.unwrap() - 0.5).abs() < 1e-9);
}

// ============================================================================
// Pollen pages
// ============================================================================

#[tokio::test]
async fn test_pollen_pages_soft_fail_per_species() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pollen/birch.html"))
        .and(query_param("plz", "8001"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<div class="forecast" data-pollen-level="3"></div>"#),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pollen/grass.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Stufe 1</p>"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pollen/hazel.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Keine Prognose</p>"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let report = client.get_pollen_pages(&region()).await.unwrap();

    assert_eq!(report.len(), 2);
    assert_eq!(report.get(PollenSpecies::Birch).unwrap().level, PollenLevel::High);
    assert_eq!(report.get(PollenSpecies::Grass).unwrap().level, PollenLevel::Low);
    assert!(report.get(PollenSpecies::Hazel).is_none());
}

// ============================================================================
// Error scenarios
// ============================================================================

#[tokio::test]
async fn test_rate_limit() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.get_alerts(&region()).await.unwrap_err();
    assert!(matches!(err, MeteoSwissError::RateLimitExceeded));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_server_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.get_latest_reading(&station()).await.unwrap_err();
    assert!(matches!(err, MeteoSwissError::ServiceUnavailable(_)));
}

#[tokio::test]
async fn test_invalid_json() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.get_alerts(&region()).await.unwrap_err();
    assert!(matches!(err, MeteoSwissError::ParseError(_)));
}

#[tokio::test]
async fn test_single_line_csv_is_decode_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/sma/ogd-smn_sma_t_now.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(READINGS_HEADER))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.get_station_forecast(&station()).await.unwrap_err();
    assert!(matches!(err, MeteoSwissError::Decode(_)));
}
