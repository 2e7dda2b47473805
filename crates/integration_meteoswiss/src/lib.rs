//! MeteoSwiss integration
//!
//! Clients and parsers for the Swiss national station network
//! (<https://data.geo.admin.ch>), the region detail API used by the
//! MeteoSwiss app, and the public pollen forecast pages.
//!
//! Station data arrives as semicolon-delimited CSV in a legacy 8-bit
//! encoding; [`csv`] takes care of decoding and header-keyed parsing, and
//! [`ParameterTable`] pins the parameter identifiers to a named version so
//! that upstream renames surface as [`MeteoSwissError::SchemaDrift`].

mod client;
mod config;
pub mod csv;
mod detail;
mod error;
mod models;
mod parameters;
mod pollen;
mod readings;
mod stations;

pub use client::MeteoSwissClient;
pub use config::MeteoSwissConfig;
pub use detail::FORECAST_WINDOW;
pub use error::MeteoSwissError;
pub use parameters::ParameterTable;
pub use pollen::extract_level;
pub use readings::STATION_FEED_ROWS;
pub use stations::{StationDirectory, StationIndex, stations_geojson};
