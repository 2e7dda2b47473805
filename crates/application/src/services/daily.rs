//! Daily forecast synthesis from hourly points

use std::collections::BTreeMap;

use chrono::{NaiveDate, Timelike};
use chrono_tz::Tz;
use domain::{DailyForecast, ForecastPoint};

/// Minutes after local midnight of the midday reference
const MIDDAY_MINUTES: i64 = 12 * 60;

/// Group hourly points by local calendar day and summarize each day
///
/// The point nearest local midday supplies the representative temperature
/// and condition. Precipitation is summed, precipitation probability is the
/// day's maximum. Days come back in chronological order.
pub fn synthesize_daily(points: &[ForecastPoint], tz: Tz) -> Vec<DailyForecast> {
    let mut days: BTreeMap<NaiveDate, Vec<(i64, &ForecastPoint)>> = BTreeMap::new();
    for point in points {
        let local = point.at.with_timezone(&tz);
        let minutes = i64::from(local.hour()) * 60 + i64::from(local.minute());
        days.entry(local.date_naive())
            .or_default()
            .push((minutes, point));
    }

    days.into_iter()
        .filter_map(|(date, day)| summarize(date, &day))
        .collect()
}

fn summarize(date: NaiveDate, day: &[(i64, &ForecastPoint)]) -> Option<DailyForecast> {
    let (_, representative) = day
        .iter()
        .min_by_key(|(minutes, _)| (minutes - MIDDAY_MINUTES).abs())?;

    let temperatures = day.iter().filter_map(|(_, p)| p.temperature_c);
    let temperature_min_c = temperatures.clone().reduce(f64::min);
    let temperature_max_c = temperatures.reduce(f64::max);

    let precipitation_mm = day
        .iter()
        .filter_map(|(_, p)| p.precipitation_mm)
        .reduce(|acc, mm| acc + mm);
    let precipitation_probability_pct = day
        .iter()
        .filter_map(|(_, p)| p.precipitation_probability_pct)
        .reduce(f64::max);

    Some(DailyForecast {
        date,
        condition: representative.condition,
        temperature_c: representative.temperature_c,
        temperature_min_c,
        temperature_max_c,
        precipitation_mm,
        precipitation_probability_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use domain::WeatherCondition;

    fn point(day: u32, hour: u32, temp: f64, rain: f64, prob: f64) -> ForecastPoint {
        ForecastPoint {
            temperature_c: Some(temp),
            precipitation_mm: Some(rain),
            precipitation_probability_pct: Some(prob),
            condition: if rain > 0.0 {
                WeatherCondition::Rain
            } else {
                WeatherCondition::Clear
            },
            ..ForecastPoint::new(
                Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap(),
                WeatherCondition::Clear,
            )
        }
    }

    #[test]
    fn test_groups_by_utc_day() {
        let points: Vec<_> = (0..48)
            .map(|h| point(1 + h / 24, h % 24, f64::from(h % 24), 0.5, f64::from(h % 24)))
            .collect();

        let days = synthesize_daily(&points, Tz::UTC);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(days[0].temperature_c, Some(12.0));
        assert_eq!(days[0].temperature_min_c, Some(0.0));
        assert_eq!(days[0].temperature_max_c, Some(23.0));
        assert!((days[0].precipitation_mm.unwrap() - 12.0).abs() < 1e-9);
        assert_eq!(days[0].precipitation_probability_pct, Some(23.0));
    }

    #[test]
    fn test_midday_is_local() {
        // 10:00 UTC is 12:00 in Zurich during summer time
        let points = vec![
            point(1, 10, 20.0, 0.0, 10.0),
            point(1, 12, 25.0, 1.2, 40.0),
        ];
        let days = synthesize_daily(&points, chrono_tz::Europe::Zurich);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].temperature_c, Some(20.0));
        assert_eq!(days[0].condition, WeatherCondition::Clear);
        assert_eq!(days[0].precipitation_probability_pct, Some(40.0));
    }

    #[test]
    fn test_local_midnight_splits_days() {
        // 22:30 UTC on June 1st is already June 2nd in Zurich
        let late = ForecastPoint::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 22, 30, 0).unwrap(),
            WeatherCondition::Fog,
        );
        let days = synthesize_daily(&[late], chrono_tz::Europe::Zurich);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
    }

    #[test]
    fn test_missing_values_stay_absent() {
        let bare = ForecastPoint::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            WeatherCondition::Overcast,
        );
        let days = synthesize_daily(&[bare], Tz::UTC);
        assert_eq!(days[0].condition, WeatherCondition::Overcast);
        assert!(days[0].temperature_min_c.is_none());
        assert!(days[0].precipitation_mm.is_none());
        assert!(days[0].precipitation_probability_pct.is_none());
    }

    #[test]
    fn test_no_points_no_days() {
        assert!(synthesize_daily(&[], Tz::UTC).is_empty());
    }
}
