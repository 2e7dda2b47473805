//! Snapshot sink that writes every update to the log

use application::{Snapshot, SnapshotKind, SnapshotSink, UpdateError, synthesize_daily};
use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;
use tracing::{info, warn};

/// Stand-in host platform: logs published values and stale markers
#[derive(Debug, Clone, Copy)]
pub struct LoggingSink {
    tz: Tz,
}

impl LoggingSink {
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

#[async_trait]
impl SnapshotSink for LoggingSink {
    async fn publish(&self, location: &str, snapshot: Snapshot) {
        match snapshot {
            Snapshot::Current(reading) => {
                info!(
                    location,
                    temperature_c = ?reading.temperature_c,
                    humidity_pct = ?reading.humidity_pct,
                    wind_speed_kmh = ?reading.wind_speed_kmh,
                    pressure_hpa = ?reading.pressure_hpa,
                    observed_at = ?reading.observed_at,
                    "Current conditions updated"
                );
            },
            Snapshot::Forecast(forecast) => {
                let days = synthesize_daily(&forecast.points, self.tz);
                info!(
                    location,
                    origin = %forecast.origin,
                    points = forecast.points.len(),
                    days = days.len(),
                    "Forecast updated"
                );
                for day in &days {
                    info!(
                        location,
                        date = %day.date,
                        condition = %day.condition,
                        min_c = ?day.temperature_min_c,
                        max_c = ?day.temperature_max_c,
                        precipitation_mm = ?day.precipitation_mm,
                        "Daily summary"
                    );
                }
            },
            Snapshot::Alerts(alerts) => {
                let now = Utc::now().with_timezone(&self.tz).naive_local();
                info!(location, alerts = alerts.len(), "Warnings updated");
                for alert in alerts.iter() {
                    info!(
                        location,
                        id = %alert.id,
                        title = %alert.title,
                        state = ?alert.state_at(now),
                        "Warning"
                    );
                }
            },
            Snapshot::Pollen(report) => {
                let levels: Vec<String> = report
                    .measurements
                    .iter()
                    .map(|(species, m)| format!("{species}={}", m.level))
                    .collect();
                info!(location, pollen = %levels.join(","), "Pollen updated");
            },
        }
    }

    async fn mark_unavailable(&self, location: &str, kind: SnapshotKind, error: &UpdateError) {
        warn!(location, kind = %kind, error = %error, "Update failed, last value is stale");
    }
}
