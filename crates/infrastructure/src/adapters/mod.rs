//! Infrastructure adapters
//!
//! Adapters connect the integration clients to the application ports:
//! one [`application::UpdateSource`] per coordinator kind and one
//! [`application::ForecastSource`] per forecast chain link.

mod alerts;
mod current;
mod error_map;
mod forecast;
mod pollen;
mod station_resolver;

pub use alerts::AlertsSource;
pub use current::{MeteoSwissCurrentSource, OpenMeteoCurrentSource};
pub use error_map::{map_meteoswiss_error, map_openmeteo_error};
pub use forecast::{
    ChainForecastSource, OpenMeteoForecastSource, RegionForecastSource, StationFeedForecastSource,
};
pub use pollen::{AirQualityPollenSource, PollenPagesSource};
pub use station_resolver::{NEAREST_STATION_MAX_KM, STATION_INDEX_KEY, StationResolver};
