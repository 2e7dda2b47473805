//! Forecast fallback chain
//!
//! Sources are tried in strict priority order; the first one yielding a
//! non-empty forecast wins.

use std::fmt;
use std::sync::Arc;

use domain::{ForecastOrigin, ForecastSnapshot};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::UpdateError;
use crate::ports::ForecastSource;

/// Ordered list of forecast sources
pub struct ForecastChain {
    sources: Vec<Arc<dyn ForecastSource>>,
    last_origin: Mutex<Option<ForecastOrigin>>,
}

impl fmt::Debug for ForecastChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origins: Vec<ForecastOrigin> = self.sources.iter().map(|s| s.origin()).collect();
        f.debug_struct("ForecastChain")
            .field("sources", &origins)
            .field("last_origin", &*self.last_origin.lock())
            .finish()
    }
}

impl ForecastChain {
    /// Build a chain; `sources` are tried front to back
    pub fn new(sources: Vec<Arc<dyn ForecastSource>>) -> Self {
        Self {
            sources,
            last_origin: Mutex::new(None),
        }
    }

    /// Source that satisfied the most recent successful resolve
    pub fn last_origin(&self) -> Option<ForecastOrigin> {
        *self.last_origin.lock()
    }

    /// Walk the chain until a source returns a non-empty forecast
    ///
    /// Errors and empty results fall through to the next source.
    /// `SourceUnavailable` marks a skipped source.
    pub async fn resolve(&self) -> Result<ForecastSnapshot, UpdateError> {
        for source in &self.sources {
            let origin = source.origin();
            match source.fetch().await {
                Ok(points) if !points.is_empty() => {
                    info!(origin = %origin, points = points.len(), "Forecast resolved");
                    *self.last_origin.lock() = Some(origin);
                    return Ok(ForecastSnapshot { origin, points });
                },
                Ok(_) => {
                    debug!(origin = %origin, "Forecast source returned no points, falling through");
                },
                Err(UpdateError::SourceUnavailable(reason)) => {
                    debug!(origin = %origin, reason = %reason, "Forecast source skipped");
                },
                Err(e) => {
                    warn!(origin = %origin, error = %e, "Forecast source failed, falling through");
                },
            }
        }
        Err(UpdateError::NoForecastSource)
    }

    /// Release every source's transport
    pub async fn close(&self) {
        for source in &self.sources {
            source.close().await;
        }
    }
}
