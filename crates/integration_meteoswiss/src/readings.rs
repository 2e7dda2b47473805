//! Station readings and near-term feed extraction

use chrono::{DateTime, NaiveDateTime, Utc};
use domain::{ForecastPoint, NormalizedReading, WeatherCondition};
use tracing::{debug, warn};

use crate::csv::{CsvRow, CsvTable};
use crate::error::MeteoSwissError;
use crate::parameters::ParameterTable;

/// Data rows read from the near-term feed
pub const STATION_FEED_ROWS: usize = 24;

const TIMESTAMP_FORMATS: [&str; 2] = ["%d.%m.%Y %H:%M", "%Y-%m-%d %H:%M"];

/// Parse a feed timestamp; the network reports UTC
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Latest reading in a readings table
///
/// The most recent row carrying any mapped parameter is authoritative.
///
/// # Errors
///
/// Returns [`MeteoSwissError::SchemaDrift`] when the header no longer
/// matches `params`, and [`MeteoSwissError::SchemaMismatch`] when no row
/// yields a single value.
pub(crate) fn reading_from_table(
    table: &CsvTable,
    params: &ParameterTable,
) -> Result<NormalizedReading, MeteoSwissError> {
    params.validate(&table.headers)?;

    let row = table
        .latest_with_any(&params.identifiers())
        .ok_or_else(|| {
            MeteoSwissError::SchemaMismatch(format!(
                "no row carries any {} parameter",
                params.version
            ))
        })?;

    let reading = reading_from_row(row, params);
    if reading.is_empty() {
        return Err(MeteoSwissError::SchemaMismatch(format!(
            "every {} parameter is absent in the latest row",
            params.version
        )));
    }
    debug!(fields = reading.present_fields(), "Extracted station reading");
    Ok(reading)
}

fn reading_from_row(row: &CsvRow, params: &ParameterTable) -> NormalizedReading {
    let observed_at = row.get(&params.timestamp_column).and_then(|raw| {
        let parsed = parse_timestamp(raw);
        if parsed.is_none() {
            warn!(timestamp = raw, "Unparsable reading timestamp");
        }
        parsed
    });

    NormalizedReading {
        temperature_c: row.number(&params.temperature),
        humidity_pct: row.number(&params.humidity),
        wind_speed_kmh: row
            .number(&params.wind_speed)
            .map(|v| v * params.wind_speed_scale),
        wind_direction_deg: row.number(&params.wind_direction),
        precipitation_mm: row.number(&params.precipitation),
        pressure_hpa: row.number(&params.pressure),
        observed_at,
    }
}

/// Points from the first [`STATION_FEED_ROWS`] rows of the near-term feed
///
/// Rows without a parsable timestamp are skipped. The condition is derived
/// from precipitation alone.
pub(crate) fn station_forecast_from_table(
    table: &CsvTable,
    params: &ParameterTable,
) -> Vec<ForecastPoint> {
    table
        .rows
        .iter()
        .take(STATION_FEED_ROWS)
        .filter_map(|row| {
            let Some(at) = row.get(&params.timestamp_column).and_then(parse_timestamp) else {
                debug!("Skipping feed row without timestamp");
                return None;
            };
            let precipitation_mm = row.number(&params.precipitation);
            Some(ForecastPoint {
                temperature_c: row.number(&params.temperature),
                precipitation_mm,
                wind_speed_kmh: row
                    .number(&params.wind_speed)
                    .map(|v| v * params.wind_speed_scale),
                wind_direction_deg: row.number(&params.wind_direction),
                ..ForecastPoint::new(at, WeatherCondition::from_precipitation(precipitation_mm))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const HEADER: &str =
        "station_abbr;reference_timestamp;tre200s0;ure200s0;fu3010z0;dkl010z0;prestas0;rre150z0";

    fn table(rows: &[&str]) -> CsvTable {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        CsvTable::parse(&text)
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 7, 1, 12, 10, 0).unwrap();
        assert_eq!(parse_timestamp("01.07.2025 12:10"), Some(expected));
        assert_eq!(parse_timestamp("2025-07-01 12:10"), Some(expected));
        assert_eq!(parse_timestamp("2025-07-01"), None);
        assert_eq!(parse_timestamp("01.07.2025"), None);
    }

    #[test]
    fn test_latest_non_empty_row_wins() {
        let table = table(&[
            "SMA;01.07.2025 12:00;20.1;55.0;7.2;240;965.1;0.0",
            "SMA;01.07.2025 12:10;20.4;54.0;8.0;250;965.0;0.1",
            "SMA;01.07.2025 12:20;;;;;;",
        ]);
        let reading = reading_from_table(&table, &ParameterTable::default()).unwrap();
        assert_eq!(reading.temperature_c, Some(20.4));
        assert_eq!(reading.humidity_pct, Some(54.0));
        assert_eq!(reading.wind_speed_kmh, Some(8.0));
        assert_eq!(reading.wind_direction_deg, Some(250.0));
        assert_eq!(reading.pressure_hpa, Some(965.0));
        assert_eq!(reading.precipitation_mm, Some(0.1));
        assert_eq!(
            reading.observed_at,
            Some(Utc.with_ymd_and_hms(2025, 7, 1, 12, 10, 0).unwrap())
        );
    }

    #[test]
    fn test_partial_row_keeps_absent_fields() {
        let table = table(&["SMA;01.07.2025 12:00;19.0;;;;;"]);
        let reading = reading_from_table(&table, &ParameterTable::default()).unwrap();
        assert_eq!(reading.temperature_c, Some(19.0));
        assert_eq!(reading.present_fields(), 1);
    }

    #[test]
    fn test_all_fields_absent_is_schema_mismatch() {
        let table = table(&["SMA;01.07.2025 12:00;;;;;;", "SMA;01.07.2025 12:10;-;-;;;;"]);
        let err = reading_from_table(&table, &ParameterTable::default()).unwrap_err();
        assert!(matches!(err, MeteoSwissError::SchemaMismatch(_)));
    }

    #[test]
    fn test_unparsable_values_are_schema_mismatch() {
        let table = table(&["SMA;01.07.2025 12:00;x;y;z;;;"]);
        let err = reading_from_table(&table, &ParameterTable::default()).unwrap_err();
        assert!(matches!(err, MeteoSwissError::SchemaMismatch(_)));
    }

    #[test]
    fn test_renamed_header_is_drift() {
        let table = CsvTable::parse(
            "station_abbr;reference_timestamp;tre200s9;ure200s9\nSMA;01.07.2025 12:00;20.0;50.0",
        );
        let err = reading_from_table(&table, &ParameterTable::default()).unwrap_err();
        assert!(matches!(err, MeteoSwissError::SchemaDrift { .. }));
    }

    #[test]
    fn test_wind_speed_scale() {
        let params = ParameterTable {
            wind_speed_scale: 3.6,
            ..ParameterTable::default()
        };
        let table = table(&["SMA;01.07.2025 12:00;;;10.0;;;"]);
        let reading = reading_from_table(&table, &params).unwrap();
        assert!((reading.wind_speed_kmh.unwrap() - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_station_forecast_takes_first_rows() {
        let rows: Vec<String> = (0..30)
            .map(|i| {
                let precip = if i % 2 == 0 { "0.0" } else { "0.4" };
                format!("SMA;01.07.2025 {:02}:{:02};{}.5;;;;;{precip}", i / 6, (i % 6) * 10, 15 + i)
            })
            .collect();
        let mut text = HEADER.to_string();
        for row in &rows {
            text.push('\n');
            text.push_str(row);
        }
        let table = CsvTable::parse(&text);

        let points = station_forecast_from_table(&table, &ParameterTable::default());
        assert_eq!(points.len(), STATION_FEED_ROWS);
        assert_eq!(points[0].at, Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap());
        assert_eq!(points[0].temperature_c, Some(15.5));
        assert_eq!(points[0].condition, WeatherCondition::PartlyCloudy);
        assert_eq!(points[1].condition, WeatherCondition::Rain);
    }

    #[test]
    fn test_station_forecast_skips_bad_timestamps() {
        let table = table(&[
            "SMA;garbage;10.0;;;;;0.0",
            "SMA;01.07.2025 00:10;11.0;;;;;",
        ]);
        let points = station_forecast_from_table(&table, &ParameterTable::default());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].temperature_c, Some(11.0));
        assert!(points[0].precipitation_mm.is_none());
    }
}
