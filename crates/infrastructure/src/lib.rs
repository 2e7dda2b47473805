//! Infrastructure layer - Adapters and ambient stack
//!
//! Implements the application ports against the upstream integration
//! clients and provides caching, retry, configuration and logging. The
//! [`runtime`] module is the composition root used by the daemon.

pub mod adapters;
pub mod cache;
pub mod config;
pub mod retry;
pub mod runtime;
pub mod telemetry;

pub use cache::{CacheRegistry, CacheStats, TtlCache, cache_key};
pub use config::{AppConfig, CacheConfig, CurrentSource, LocationConfig, PollenMode};
pub use retry::{
    AttemptTimeout, RetryConfig, RetryResult, Retryable, retry, retry_with_timeout, with_retry,
};
pub use runtime::{ALERTS_INTERVAL, LocationRuntime, RuntimeError, Services};
pub use telemetry::{TelemetryConfig, TelemetryError, init_telemetry};
