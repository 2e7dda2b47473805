//! Region detail conversion: warnings and the app forecast

use std::collections::HashSet;

use chrono::{DateTime, DurationRound, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use domain::{AlertCategory, ForecastPoint, RegionCode, WeatherAlert, WeatherCondition};
use tracing::{debug, warn};

use crate::models::{DayForecast, Graph, RawWarning, RegionDetail, at, parse_warnings};

/// Hourly points in one forecast window
pub const FORECAST_WINDOW: usize = 24;

const SLOT_HOURS: u32 = 3;

/// Published warning levels
const SEVERITY_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Unix milliseconds to wall-clock time in `tz`
pub(crate) fn local_from_millis(millis: i64, tz: Tz) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|utc| utc.with_timezone(&tz).naive_local())
}

/// Normalize every warning in the detail document
///
/// Derived ids may repeat when two warnings share type, level and start;
/// repeats are logged and kept.
pub(crate) fn alerts_from_detail(
    detail: RegionDetail,
    region: &RegionCode,
    tz: Tz,
) -> Vec<WeatherAlert> {
    let alerts: Vec<WeatherAlert> = parse_warnings(detail.warnings)
        .into_iter()
        .map(|w| alert_from_warning(w, region, tz))
        .collect();

    let mut seen = HashSet::new();
    for alert in &alerts {
        if !seen.insert(alert.id.as_str()) {
            warn!(id = %alert.id, "Duplicate derived alert id");
        }
    }
    alerts
}

/// Level clamped into the published range
fn severity_of(warning: &RawWarning) -> u8 {
    let level = warning
        .warn_level
        .clamp(*SEVERITY_RANGE.start(), *SEVERITY_RANGE.end());
    if level != warning.warn_level {
        warn!(
            warn_type = warning.warn_type,
            warn_level = warning.warn_level,
            clamped = level,
            "Warning level out of range"
        );
    }
    level
}

fn alert_from_warning(warning: RawWarning, region: &RegionCode, tz: Tz) -> WeatherAlert {
    let category = AlertCategory::from_code(warning.warn_type);
    let severity = severity_of(&warning);
    let start = warning
        .valid_from
        .map_or_else(|| "now".to_string(), |ms| ms.to_string());
    let description = if warning.text.trim().is_empty() {
        warning.html_text.unwrap_or_default()
    } else {
        warning.text
    };

    WeatherAlert {
        id: format!(
            "{}_{}_{}_{start}",
            region.postal_code(),
            severity,
            warning.warn_type
        ),
        category,
        severity,
        title: WeatherAlert::compose_title(category, severity),
        description,
        valid_from: warning.valid_from.and_then(|ms| local_from_millis(ms, tz)),
        valid_to: warning.valid_to.and_then(|ms| local_from_millis(ms, tz)),
        is_outlook: warning.outlook,
    }
}

/// Hourly points from the three-hourly graph, or from the daily forecast
/// when the graph is missing or empty
pub(crate) fn forecast_from_detail(detail: &RegionDetail, tz: Tz) -> Vec<ForecastPoint> {
    if let Some(graph) = detail.graph.as_ref().filter(|g| g.slots() > 0) {
        debug!(slots = graph.slots(), "Expanding three-hourly graph");
        return expand_graph(graph);
    }
    debug!(days = detail.forecast.len(), "Flattening daily forecast");
    detail
        .forecast
        .iter()
        .flat_map(|day| flatten_day(day, tz))
        .collect()
}

/// Repeat every slot for each of its hours; precipitation is spread evenly
fn expand_graph(graph: &Graph) -> Vec<ForecastPoint> {
    let Some(start) = DateTime::from_timestamp_millis(graph.start) else {
        return Vec::new();
    };

    let mut points = Vec::with_capacity(graph.slots() * SLOT_HOURS as usize);
    let slot_starts = (0_i64..).step_by(SLOT_HOURS as usize);
    for (slot, slot_start) in (0..graph.slots()).zip(slot_starts) {
        let condition = at(&graph.weather_icon3h, slot)
            .map_or(WeatherCondition::PartlyCloudy, WeatherCondition::from_meteoswiss_icon);
        let precipitation = at(&graph.precipitation3h, slot).map(|p| p / f64::from(SLOT_HOURS));
        for hour in 0..i64::from(SLOT_HOURS) {
            let offset = slot_start + hour;
            points.push(ForecastPoint {
                temperature_c: at(&graph.temperature_mean3h, slot),
                precipitation_mm: precipitation,
                precipitation_probability_pct: at(&graph.precipitation_probability3h, slot),
                wind_speed_kmh: at(&graph.wind_speed3h, slot),
                wind_direction_deg: at(&graph.wind_direction3h, slot),
                ..ForecastPoint::new(start + TimeDelta::hours(offset), condition)
            });
        }
    }
    points
}

/// One day as 24 identical hourly points from local midnight
fn flatten_day(day: &DayForecast, tz: Tz) -> Vec<ForecastPoint> {
    let Ok(date) = NaiveDate::parse_from_str(&day.day_date, "%Y-%m-%d") else {
        warn!(date = %day.day_date, "Unparsable forecast day");
        return Vec::new();
    };
    let Some(midnight) = tz
        .from_local_datetime(&date.and_time(chrono::NaiveTime::MIN))
        .earliest()
    else {
        return Vec::new();
    };
    let midnight = midnight.with_timezone(&Utc);

    let temperature = match (day.temperature_min, day.temperature_max) {
        (Some(min), Some(max)) => Some(f64::midpoint(min, max)),
        (min, max) => min.or(max),
    };
    let precipitation = day.precipitation.map(|p| p / 24.0);
    let condition = day
        .icon_day
        .map_or(WeatherCondition::PartlyCloudy, WeatherCondition::from_meteoswiss_icon);

    (0..24)
        .map(|hour| ForecastPoint {
            temperature_c: temperature,
            precipitation_mm: precipitation,
            ..ForecastPoint::new(midnight + TimeDelta::hours(hour), condition)
        })
        .collect()
}

/// Up to [`FORECAST_WINDOW`] points starting at the hour containing `now`,
/// or the first points when none is that recent
pub(crate) fn select_window(points: Vec<ForecastPoint>, now: DateTime<Utc>) -> Vec<ForecastPoint> {
    let hour = now.duration_trunc(TimeDelta::hours(1)).unwrap_or(now);
    let start = points.iter().position(|p| p.at >= hour).unwrap_or(0);
    points.into_iter().skip(start).take(FORECAST_WINDOW).collect()
}
