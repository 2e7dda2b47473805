//! Domain entities - Records produced by one poll cycle

mod alert;
mod condition;
mod forecast;
mod pollen;
mod reading;
mod station;

pub use alert::{AlertCategory, AlertState, WeatherAlert};
pub use condition::WeatherCondition;
pub use forecast::{DailyForecast, ForecastOrigin, ForecastPoint, ForecastSnapshot};
pub use pollen::{PollenLevel, PollenMeasurement, PollenReport, PollenSpecies};
pub use reading::NormalizedReading;
pub use station::Station;
