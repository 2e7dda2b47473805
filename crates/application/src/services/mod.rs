//! Application services - Polling runtime and forecast orchestration

mod coordinator;
mod daily;
mod forecast_chain;

pub use coordinator::{
    Coordinator, CoordinatorState, CoordinatorStatus, MIN_UPDATE_INTERVAL, UpdateInterval,
};
pub use daily::synthesize_daily;
pub use forecast_chain::ForecastChain;
