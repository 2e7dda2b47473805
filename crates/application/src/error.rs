//! Update-cycle errors

use thiserror::Error;

/// Why a single update cycle failed
///
/// Errors never travel past a coordinator tick. The coordinator keeps the
/// previous snapshot and marks it unavailable instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpdateError {
    /// Timeout, connection failure or non-success status
    #[error("Transient network error: {0}")]
    TransientNetwork(String),

    /// No text encoding produced usable content
    #[error("Decode error: {0}")]
    Decode(String),

    /// Response parsed but none of the expected fields were present
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Too few known field identifiers in a live response
    #[error("Schema drift against {version}: missing {}", missing.join(", "))]
    SchemaDrift {
        version: String,
        missing: Vec<String>,
    },

    /// Required input (coordinates, station, region code) not configured
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Upstream answered with no usable data
    #[error("Empty payload from {0}")]
    EmptyPayload(String),

    /// Every forecast source failed or was inapplicable
    #[error("No forecast source available")]
    NoForecastSource,
}

impl UpdateError {
    /// Only transient network failures are worth another attempt
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientNetwork(_))
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::TransientNetwork(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable(message.into())
    }
}
