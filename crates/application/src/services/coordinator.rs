//! Periodic update coordinator
//!
//! One coordinator owns fetch, normalize and publish for a single data kind
//! and location. Ticks of one coordinator are strictly sequential; separate
//! coordinators run independently.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::UpdateError;
use crate::ports::UpdateSource;

/// Smallest allowed poll period for upstream rate limits
pub const MIN_UPDATE_INTERVAL: Duration = Duration::from_secs(600);

/// Poll period helper
#[derive(Debug, Clone, Copy)]
pub struct UpdateInterval;

impl UpdateInterval {
    /// Raise `requested` to `minimum` when it is below it
    #[must_use]
    pub fn clamped(requested: Duration, minimum: Duration) -> Duration {
        if requested < minimum {
            warn!(
                requested_secs = requested.as_secs(),
                minimum_secs = minimum.as_secs(),
                "Update interval below minimum, using minimum"
            );
            minimum
        } else {
            requested
        }
    }
}

/// Where the coordinator is in its cycle
///
/// `Updated` and `Failed` are idle states that remember the outcome of the
/// last tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorStatus {
    Idle,
    Fetching,
    Updated,
    Failed,
}

/// Observable coordinator state
#[derive(Debug)]
pub struct CoordinatorState<T> {
    pub status: CoordinatorStatus,
    /// Last good value; survives failed ticks
    pub data: Option<Arc<T>>,
    /// False after a failed tick until the next success
    pub available: bool,
    pub last_error: Option<UpdateError>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}

impl<T> Default for CoordinatorState<T> {
    fn default() -> Self {
        Self {
            status: CoordinatorStatus::Idle,
            data: None,
            available: false,
            last_error: None,
            last_success_at: None,
            last_attempt_at: None,
            consecutive_failures: 0,
        }
    }
}

impl<T> Clone for CoordinatorState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            available: self.available,
            last_error: self.last_error.clone(),
            last_success_at: self.last_success_at,
            last_attempt_at: self.last_attempt_at,
            consecutive_failures: self.consecutive_failures,
        }
    }
}

/// Runs an [`UpdateSource`] on a fixed period
pub struct Coordinator<T>
where
    T: Send + Sync + 'static,
{
    name: String,
    interval: Duration,
    source: Arc<dyn UpdateSource<T>>,
    state: watch::Receiver<CoordinatorState<T>>,
    refresh: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl<T> fmt::Debug for Coordinator<T>
where
    T: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("source", &self.source.name())
            .finish_non_exhaustive()
    }
}

impl<T> Coordinator<T>
where
    T: Send + Sync + 'static,
{
    /// Start polling `source` now and then every `interval`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        name: impl Into<String>,
        interval: Duration,
        source: Arc<dyn UpdateSource<T>>,
    ) -> Self {
        let name = name.into();
        let (state_tx, state_rx) = watch::channel(CoordinatorState::default());
        let refresh = Arc::new(Notify::new());

        info!(
            coordinator = %name,
            source = source.name(),
            interval_secs = interval.as_secs(),
            "Starting coordinator"
        );

        let handle = tokio::spawn(run_loop(
            name.clone(),
            interval,
            Arc::clone(&source),
            state_tx,
            Arc::clone(&refresh),
        ));

        Self {
            name,
            interval,
            source,
            state: state_rx,
            refresh,
            handle,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Last good value, if any
    #[must_use]
    pub fn current(&self) -> Option<Arc<T>> {
        self.state.borrow().data.clone()
    }

    /// Snapshot of the full state
    #[must_use]
    pub fn state(&self) -> CoordinatorState<T> {
        self.state.borrow().clone()
    }

    /// Receiver notified after every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState<T>> {
        self.state.clone()
    }

    /// Run a tick as soon as the current one (if any) finishes
    pub fn request_refresh(&self) {
        debug!(coordinator = %self.name, "Refresh requested");
        self.refresh.notify_one();
    }

    /// Stop polling, abort an in-flight tick and release the transport
    pub async fn shutdown(mut self) {
        self.handle.abort();
        if let Err(e) = (&mut self.handle).await
            && !e.is_cancelled()
        {
            warn!(coordinator = %self.name, error = %e, "Coordinator task ended abnormally");
        }
        self.source.close().await;
        info!(coordinator = %self.name, "Coordinator stopped");
    }
}

/// Dropping without [`Coordinator::shutdown`] stops the loop but does not
/// call [`UpdateSource::close`].
impl<T> Drop for Coordinator<T>
where
    T: Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run_loop<T>(
    name: String,
    interval: Duration,
    source: Arc<dyn UpdateSource<T>>,
    state: watch::Sender<CoordinatorState<T>>,
    refresh: Arc<Notify>,
) where
    T: Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {},
            () = refresh.notified() => {
                ticker.reset();
            },
        }
        run_tick(&name, source.as_ref(), &state).await;
    }
}

async fn run_tick<T>(
    name: &str,
    source: &dyn UpdateSource<T>,
    state: &watch::Sender<CoordinatorState<T>>,
) where
    T: Send + Sync + 'static,
{
    state.send_modify(|s| {
        s.status = CoordinatorStatus::Fetching;
        s.last_attempt_at = Some(Utc::now());
    });

    match source.fetch().await {
        Ok(value) => {
            debug!(coordinator = %name, source = source.name(), "Update succeeded");
            state.send_modify(|s| {
                s.status = CoordinatorStatus::Updated;
                s.data = Some(Arc::new(value));
                s.available = true;
                s.last_error = None;
                s.last_success_at = Some(Utc::now());
                s.consecutive_failures = 0;
            });
        },
        Err(e) => {
            warn!(
                coordinator = %name,
                source = source.name(),
                error = %e,
                "Update failed, keeping last snapshot"
            );
            state.send_modify(|s| {
                s.status = CoordinatorStatus::Failed;
                s.available = false;
                s.last_error = Some(e);
                s.consecutive_failures = s.consecutive_failures.saturating_add(1);
            });
        },
    }
}
