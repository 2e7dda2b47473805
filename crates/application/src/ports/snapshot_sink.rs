//! Host platform port

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use domain::{ForecastSnapshot, NormalizedReading, PollenReport, WeatherAlert};
#[cfg(test)]
use mockall::automock;

use crate::error::UpdateError;

/// Which data kind a snapshot carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    Current,
    Forecast,
    Alerts,
    Pollen,
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Current => "current",
            Self::Forecast => "forecast",
            Self::Alerts => "alerts",
            Self::Pollen => "pollen",
        })
    }
}

/// A freshly published value for one location
#[derive(Debug, Clone)]
pub enum Snapshot {
    Current(Arc<NormalizedReading>),
    Forecast(Arc<ForecastSnapshot>),
    Alerts(Arc<Vec<WeatherAlert>>),
    Pollen(Arc<PollenReport>),
}

impl Snapshot {
    #[must_use]
    pub const fn kind(&self) -> SnapshotKind {
        match self {
            Self::Current(_) => SnapshotKind::Current,
            Self::Forecast(_) => SnapshotKind::Forecast,
            Self::Alerts(_) => SnapshotKind::Alerts,
            Self::Pollen(_) => SnapshotKind::Pollen,
        }
    }
}

/// Receiver of normalized snapshots (the host platform's entity layer)
///
/// After `mark_unavailable` the sink keeps showing the last published
/// value, flagged stale.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// A cycle succeeded with a new value
    async fn publish(&self, location: &str, snapshot: Snapshot);

    /// A cycle failed; keep the previous value and flag it stale
    async fn mark_unavailable(&self, location: &str, kind: SnapshotKind, error: &UpdateError);
}
