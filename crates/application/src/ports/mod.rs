//! Port definitions for application layer
//!
//! Ports are interfaces that define how the polling runtime talks to
//! upstream sources and to the host platform. Adapters in the
//! infrastructure layer implement these ports.

mod forecast_source;
mod snapshot_sink;
mod update_source;

#[cfg(test)]
pub use forecast_source::MockForecastSource;
pub use forecast_source::ForecastSource;
#[cfg(test)]
pub use snapshot_sink::MockSnapshotSink;
pub use snapshot_sink::{Snapshot, SnapshotKind, SnapshotSink};
pub use update_source::UpdateSource;
