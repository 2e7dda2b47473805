//! Open-Meteo integration
//!
//! Client for the Open-Meteo forecast API (<https://open-meteo.com>) and its
//! air-quality API. Provides current conditions, an hourly forecast window
//! and pollen concentrations for a coordinate pair, normalized into the
//! domain records. No API key is required.

mod client;
mod config;
mod error;
mod models;

pub use client::{HOURLY_WINDOW, OpenMeteoClient};
pub use config::OpenMeteoConfig;
pub use error::OpenMeteoError;
