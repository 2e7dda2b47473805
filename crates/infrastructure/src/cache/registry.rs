//! Per-kind cache instances

use std::sync::Arc;
use std::time::Duration;

use domain::{ForecastSnapshot, NormalizedReading, PollenReport};
use integration_meteoswiss::StationIndex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{CacheStats, TtlCache};
use crate::config::CacheConfig;

/// One [`TtlCache`] per data kind, shared by every location's adapters
///
/// Constructed once by the composition root and passed around in an `Arc`.
#[derive(Debug)]
pub struct CacheRegistry {
    pub current: TtlCache<Arc<NormalizedReading>>,
    pub forecast: TtlCache<Arc<ForecastSnapshot>>,
    pub stations: TtlCache<Arc<StationIndex>>,
    pub pollen: TtlCache<Arc<PollenReport>>,
}

impl CacheRegistry {
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            current: TtlCache::new("current", config.ttl_current()),
            forecast: TtlCache::new("forecast", config.ttl_forecast()),
            stations: TtlCache::new("stations", config.ttl_stations()),
            pollen: TtlCache::new("pollen", config.ttl_pollen()),
        }
    }

    /// Sweep expired entries from every cache
    pub fn cleanup_expired(&self) -> usize {
        let removed = self.current.cleanup_expired()
            + self.forecast.cleanup_expired()
            + self.stations.cleanup_expired()
            + self.pollen.cleanup_expired();
        debug!(removed, "Cache sweep finished");
        removed
    }

    /// Run [`CacheRegistry::cleanup_expired`] every `period`
    ///
    /// The first sweep happens one period after the call. Abort the handle
    /// to stop sweeping.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                registry.cleanup_expired();
            }
        })
    }

    /// Counters per cache, keyed by cache name
    pub fn stats(&self) -> [(&'static str, CacheStats); 4] {
        [
            (self.current.name(), self.current.stats()),
            (self.forecast.name(), self.forecast.stats()),
            (self.stations.name(), self.stations.stats()),
            (self.pollen.name(), self.pollen.stats()),
        ]
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
