//! Composition root
//!
//! [`Services`] holds what every location shares: the upstream clients,
//! the station directory, the cache registry and the retry policy.
//! [`LocationRuntime`] wires one location's coordinators from it and
//! forwards their state changes to a [`SnapshotSink`].

use std::sync::Arc;
use std::time::Duration;

use application::{
    Coordinator, CoordinatorState, CoordinatorStatus, ForecastChain, ForecastSource,
    MIN_UPDATE_INTERVAL, Snapshot, SnapshotKind, SnapshotSink, UpdateInterval, UpdateSource,
};
use domain::{
    DomainError, ForecastOrigin, ForecastSnapshot, NormalizedReading, PollenReport, WeatherAlert,
};
use integration_meteoswiss::{MeteoSwissClient, MeteoSwissError, StationDirectory};
use integration_openmeteo::{OpenMeteoClient, OpenMeteoError};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::adapters::{
    AirQualityPollenSource, AlertsSource, ChainForecastSource, MeteoSwissCurrentSource,
    OpenMeteoCurrentSource, OpenMeteoForecastSource, PollenPagesSource, RegionForecastSource,
    StationFeedForecastSource, StationResolver,
};
use crate::cache::CacheRegistry;
use crate::config::{AppConfig, CurrentSource, LocationConfig, PollenMode};
use crate::retry::RetryConfig;

/// Fixed poll period of the warnings coordinator
pub const ALERTS_INTERVAL: Duration = Duration::from_secs(600);

/// Failure to assemble the runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Failed to build MeteoSwiss client: {0}")]
    MeteoSwiss(#[from] MeteoSwissError),

    #[error("Failed to build Open-Meteo client: {0}")]
    OpenMeteo(#[from] OpenMeteoError),

    #[error("Invalid location '{location}': {source}")]
    InvalidLocation {
        location: String,
        #[source]
        source: DomainError,
    },
}

/// Resources shared by every location
#[derive(Debug, Clone)]
pub struct Services {
    pub meteoswiss: Arc<MeteoSwissClient>,
    pub openmeteo: Arc<OpenMeteoClient>,
    pub directory: Arc<StationDirectory>,
    pub cache: Arc<CacheRegistry>,
    pub retry: RetryConfig,
}

impl Services {
    /// Build clients and caches from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, RuntimeError> {
        let meteoswiss = Arc::new(MeteoSwissClient::new(config.meteoswiss_client())?);
        let openmeteo = Arc::new(OpenMeteoClient::new(config.openmeteo_client())?);
        Ok(Self {
            directory: Arc::new(StationDirectory::new(Arc::clone(&meteoswiss))),
            meteoswiss,
            openmeteo,
            cache: Arc::new(CacheRegistry::new(&config.cache)),
            retry: config.retry.clone(),
        })
    }
}

/// Every coordinator of one location
pub struct LocationRuntime {
    name: String,
    current: Coordinator<NormalizedReading>,
    forecast: Coordinator<ForecastSnapshot>,
    forecast_source: Arc<ChainForecastSource>,
    alerts: Option<Coordinator<Vec<WeatherAlert>>>,
    pollen: Option<Coordinator<PollenReport>>,
    forwarders: Forwarders,
}

/// Snapshot forwarding tasks, aborted when dropped
#[derive(Debug, Default)]
struct Forwarders(Vec<JoinHandle<()>>);

impl Forwarders {
    fn abort_all(&self) {
        for task in &self.0 {
            task.abort();
        }
    }
}

impl Drop for Forwarders {
    fn drop(&mut self) {
        self.abort_all();
    }
}

impl std::fmt::Debug for LocationRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationRuntime")
            .field("name", &self.name)
            .field("current", &self.current)
            .field("forecast", &self.forecast)
            .field("alerts", &self.alerts)
            .field("pollen", &self.pollen)
            .finish_non_exhaustive()
    }
}

impl LocationRuntime {
    /// Spawn the location's coordinators and start forwarding to `sink`
    ///
    /// Must be called from within a tokio runtime. Every coordinator ticks
    /// immediately.
    pub fn start(
        location: &LocationConfig,
        services: &Services,
        sink: Arc<dyn SnapshotSink>,
    ) -> Result<Self, RuntimeError> {
        let invalid = |source| RuntimeError::InvalidLocation {
            location: location.name.clone(),
            source,
        };
        let geo = location.geo_location().map_err(invalid)?;
        let station = location.station().map_err(invalid)?;
        let region = location.region().map_err(invalid)?;

        let name = location.name.clone();
        let interval = UpdateInterval::clamped(location.update_interval(), MIN_UPDATE_INTERVAL);

        let resolver = Arc::new(StationResolver::new(
            station,
            geo,
            Arc::clone(&services.directory),
            Arc::clone(&services.cache),
        ));

        let current_source: Arc<dyn UpdateSource<NormalizedReading>> = match location.current_source
        {
            CurrentSource::MeteoSwiss => Arc::new(MeteoSwissCurrentSource::new(
                Arc::clone(&services.meteoswiss),
                Arc::clone(&resolver),
                Arc::clone(&services.cache),
                services.retry.clone(),
            )),
            CurrentSource::OpenMeteo => Arc::new(OpenMeteoCurrentSource::new(
                Arc::clone(&services.openmeteo),
                geo,
                Arc::clone(&services.cache),
                services.retry.clone(),
            )),
        };

        let chain_links: Vec<Arc<dyn ForecastSource>> = vec![
            Arc::new(OpenMeteoForecastSource::new(
                Arc::clone(&services.openmeteo),
                geo,
                services.retry.clone(),
            )),
            Arc::new(StationFeedForecastSource::new(
                Arc::clone(&services.meteoswiss),
                Arc::clone(&resolver),
            )),
            Arc::new(RegionForecastSource::new(
                Arc::clone(&services.meteoswiss),
                region.clone(),
            )),
        ];
        let forecast_source = Arc::new(ChainForecastSource::new(
            ForecastChain::new(chain_links),
            Arc::clone(&services.cache),
            &name,
        ));

        let alerts_source: Option<Arc<dyn UpdateSource<Vec<WeatherAlert>>>> =
            match (&region, location.alerts) {
                (Some(region), true) => Some(Arc::new(AlertsSource::new(
                    Arc::clone(&services.meteoswiss),
                    region.clone(),
                    services.retry.clone(),
                ))),
                (None, true) => {
                    warn!(location = %name, "Alerts enabled but no postal code configured");
                    None
                },
                (_, false) => None,
            };

        let pollen_source: Option<Arc<dyn UpdateSource<PollenReport>>> = match location.pollen {
            PollenMode::AirQuality => Some(Arc::new(AirQualityPollenSource::new(
                Arc::clone(&services.openmeteo),
                geo,
                Arc::clone(&services.cache),
                services.retry.clone(),
            ))),
            PollenMode::Pages => match region {
                Some(region) => Some(Arc::new(PollenPagesSource::new(
                    Arc::clone(&services.meteoswiss),
                    region,
                ))),
                None => {
                    warn!(location = %name, "Pollen pages need a postal code, pollen disabled");
                    None
                },
            },
            PollenMode::Disabled => None,
        };

        let current = Coordinator::spawn(format!("{name}/current"), interval, current_source);
        let forecast = Coordinator::spawn(
            format!("{name}/forecast"),
            interval,
            Arc::clone(&forecast_source) as Arc<dyn UpdateSource<ForecastSnapshot>>,
        );
        let alerts = alerts_source
            .map(|source| Coordinator::spawn(format!("{name}/alerts"), ALERTS_INTERVAL, source));
        let pollen =
            pollen_source.map(|source| Coordinator::spawn(format!("{name}/pollen"), interval, source));

        let mut forwarders = vec![
            forward(
                &name,
                current.subscribe(),
                Arc::clone(&sink),
                SnapshotKind::Current,
                Snapshot::Current,
            ),
            forward(
                &name,
                forecast.subscribe(),
                Arc::clone(&sink),
                SnapshotKind::Forecast,
                Snapshot::Forecast,
            ),
        ];
        if let Some(alerts) = &alerts {
            forwarders.push(forward(
                &name,
                alerts.subscribe(),
                Arc::clone(&sink),
                SnapshotKind::Alerts,
                Snapshot::Alerts,
            ));
        }
        if let Some(pollen) = &pollen {
            forwarders.push(forward(
                &name,
                pollen.subscribe(),
                Arc::clone(&sink),
                SnapshotKind::Pollen,
                Snapshot::Pollen,
            ));
        }

        info!(
            location = %name,
            interval_secs = interval.as_secs(),
            current = %location.current_source,
            alerts = alerts.is_some(),
            pollen = pollen.is_some(),
            "Location runtime started"
        );

        Ok(Self {
            name,
            current,
            forecast,
            forecast_source,
            alerts,
            pollen,
            forwarders: Forwarders(forwarders),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn current(&self) -> &Coordinator<NormalizedReading> {
        &self.current
    }

    pub const fn forecast(&self) -> &Coordinator<ForecastSnapshot> {
        &self.forecast
    }

    pub const fn alerts(&self) -> Option<&Coordinator<Vec<WeatherAlert>>> {
        self.alerts.as_ref()
    }

    pub const fn pollen(&self) -> Option<&Coordinator<PollenReport>> {
        self.pollen.as_ref()
    }

    /// Chain link that produced the last freshly resolved forecast
    pub fn forecast_origin(&self) -> Option<ForecastOrigin> {
        self.forecast_source.last_origin()
    }

    /// Ask every coordinator for an immediate tick
    pub fn request_refresh(&self) {
        self.current.request_refresh();
        self.forecast.request_refresh();
        if let Some(alerts) = &self.alerts {
            alerts.request_refresh();
        }
        if let Some(pollen) = &self.pollen {
            pollen.request_refresh();
        }
    }

    /// Stop forwarding and tear down every coordinator
    pub async fn shutdown(self) {
        self.forwarders.abort_all();
        self.current.shutdown().await;
        self.forecast.shutdown().await;
        if let Some(alerts) = self.alerts {
            alerts.shutdown().await;
        }
        if let Some(pollen) = self.pollen {
            pollen.shutdown().await;
        }
        info!(location = %self.name, "Location runtime stopped");
    }
}

/// Relay finished ticks of one coordinator to the sink
///
/// Intermediate states (`Fetching`) are not forwarded. Ends when the
/// coordinator's state channel closes.
fn forward<T>(
    location: &str,
    mut rx: watch::Receiver<CoordinatorState<T>>,
    sink: Arc<dyn SnapshotSink>,
    kind: SnapshotKind,
    wrap: fn(Arc<T>) -> Snapshot,
) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
{
    let location = location.to_string();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            match state.status {
                CoordinatorStatus::Updated => {
                    if let Some(data) = state.data {
                        sink.publish(&location, wrap(data)).await;
                    }
                },
                CoordinatorStatus::Failed => {
                    if let Some(error) = &state.last_error {
                        sink.mark_unavailable(&location, kind, error).await;
                    }
                },
                CoordinatorStatus::Idle | CoordinatorStatus::Fetching => {},
            }
        }
        debug!(location = %location, kind = %kind, "Snapshot forwarding ended");
    })
}
