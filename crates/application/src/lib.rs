//! Application layer - Ports and polling orchestration
//!
//! Defines the ports that upstream adapters implement, the periodic
//! coordinator runtime shared by every data kind, and the forecast
//! fallback chain.

pub mod error;
pub mod ports;
pub mod services;

pub use error::UpdateError;
pub use ports::*;
pub use services::*;
