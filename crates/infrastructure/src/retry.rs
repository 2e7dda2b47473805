//! Generic retry logic with exponential backoff
//!
//! Wraps a fallible async operation with bounded retries. The delay after
//! the n-th failed attempt is `base_delay * 2^(n-1)`, capped at
//! `max_delay`, with optional jitter so that coordinators of many
//! locations do not retry in lockstep after a shared outage.
//!
//! # Example
//!
//! ```rust,ignore
//! use infrastructure::retry::{RetryConfig, retry_with_timeout};
//!
//! let config = RetryConfig::default();
//! let reading = retry_with_timeout(&config, || async {
//!     client.get_latest_reading(&station).await.map_err(map_error)
//! }).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use application::UpdateError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Configuration for retry behavior with exponential backoff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one (default: 4)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after the first failure in milliseconds (default: 1000ms)
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,

    /// Maximum delay between attempts in milliseconds (default: 10000ms)
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Whether to add jitter to the delay (default: true)
    #[serde(default = "default_true")]
    pub jitter_enabled: bool,

    /// Maximum jitter factor (0.0 to 1.0, default: 0.1 = 10%)
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,

    /// Per-attempt timeout in seconds (default: 30)
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,
}

const fn default_max_attempts() -> u32 {
    4
}

const fn default_base_delay() -> u64 {
    1000
}

const fn default_max_delay() -> u64 {
    10_000
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_true() -> bool {
    true
}

const fn default_jitter_factor() -> f64 {
    0.1
}

const fn default_attempt_timeout() -> u64 {
    30
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
            multiplier: default_multiplier(),
            jitter_enabled: default_true(),
            jitter_factor: default_jitter_factor(),
            attempt_timeout_secs: default_attempt_timeout(),
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom parameters
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
            max_delay_ms,
            multiplier: 2.0,
            jitter_enabled: true,
            jitter_factor: 0.1,
            attempt_timeout_secs: 30,
        }
    }

    /// Disable jitter
    #[must_use]
    pub const fn without_jitter(mut self) -> Self {
        self.jitter_enabled = false;
        self
    }

    /// Per-attempt timeout
    #[must_use]
    pub const fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Delay after the given failed attempt (1-indexed)
    ///
    /// `base_delay * multiplier^(attempt-1)`, capped at `max_delay`, with
    /// optional jitter.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63) as i32;
        let base_delay = (self.base_delay_ms as f64) * self.multiplier.powi(exponent);
        let capped_delay = base_delay.min(self.max_delay_ms as f64);

        let final_delay = if self.jitter_enabled && self.jitter_factor > 0.0 {
            let jitter_range = capped_delay * self.jitter_factor;
            let jitter = rand::rng().random_range(-jitter_range..=jitter_range);
            (capped_delay + jitter).max(0.0)
        } else {
            capped_delay
        };

        Duration::from_millis(final_delay as u64)
    }
}

/// Trait for errors that can be checked for retryability
pub trait Retryable {
    /// Returns true if this error is retryable
    fn is_retryable(&self) -> bool;
}

impl Retryable for UpdateError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }
}

/// A single attempt exceeded its time budget
#[derive(Debug, Clone, Copy, Error)]
#[error("Attempt timed out after {} seconds", .0.as_secs())]
pub struct AttemptTimeout(pub Duration);

impl From<AttemptTimeout> for UpdateError {
    fn from(err: AttemptTimeout) -> Self {
        Self::TransientNetwork(err.to_string())
    }
}

/// Retry result containing either success or the last error
#[derive(Debug)]
pub struct RetryResult<T, E> {
    /// The result of the operation
    pub result: Result<T, E>,
    /// Number of attempts made (1 = no retries, 2 = one retry, etc.)
    pub attempts: u32,
    /// Total time spent including retries
    pub total_duration: Duration,
}

impl<T, E> RetryResult<T, E> {
    /// Check if the operation succeeded
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Check if the operation failed
    #[must_use]
    pub const fn is_err(&self) -> bool {
        self.result.is_err()
    }

    /// Convert to standard Result, discarding metadata
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Execute an async operation with retry logic
///
/// Retries the operation while it fails with a retryable error and
/// attempts remain; the last error is returned once they are exhausted.
#[allow(clippy::cast_possible_truncation)]
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    let start = Instant::now();
    let max_attempts = config.max_attempts.max(1);
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        match operation().await {
            Ok(value) => {
                if attempts > 1 {
                    debug!(
                        attempts = attempts,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Operation succeeded after retries"
                    );
                }
                return RetryResult {
                    result: Ok(value),
                    attempts,
                    total_duration: start.elapsed(),
                };
            },
            Err(err) => {
                if !err.is_retryable() {
                    debug!(
                        attempts = attempts,
                        error = %err,
                        "Operation failed with non-retryable error"
                    );
                    return RetryResult {
                        result: Err(err),
                        attempts,
                        total_duration: start.elapsed(),
                    };
                }

                if attempts >= max_attempts {
                    warn!(
                        attempts = attempts,
                        max_attempts = max_attempts,
                        error = %err,
                        "Operation failed after max attempts"
                    );
                    return RetryResult {
                        result: Err(err),
                        attempts,
                        total_duration: start.elapsed(),
                    };
                }

                let delay = config.delay_for_attempt(attempts);
                warn!(
                    attempt = attempts,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Operation failed, retrying"
                );

                tokio::time::sleep(delay).await;
            },
        }
    }
}

/// Execute an async operation with retry logic, returning only the Result
pub async fn retry<F, Fut, T, E>(config: &RetryConfig, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    with_retry(config, operation).await.into_result()
}

/// Like [`retry`], but every attempt is bounded by the configured timeout
///
/// A timed-out attempt counts as a failure with [`AttemptTimeout`].
pub async fn retry_with_timeout<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display + From<AttemptTimeout>,
{
    let timeout = config.attempt_timeout();
    retry(config, || {
        let attempt = operation();
        async move {
            tokio::time::timeout(timeout, attempt)
                .await
                .unwrap_or_else(|_| Err(AttemptTimeout(timeout).into()))
        }
    })
    .await
}
