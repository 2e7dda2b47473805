//! MeteoSwiss error types

use thiserror::Error;

/// Errors that can occur while talking to MeteoSwiss services
#[derive(Debug, Error)]
pub enum MeteoSwissError {
    /// Connection to the service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request returned a non-success status
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Service is temporarily unavailable (5xx)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Request timed out
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// Station, asset or page does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse a JSON document or a field value
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No encoding candidate produced usable CSV
    #[error("Decode error: {0}")]
    Decode(String),

    /// Response parsed, but none of the mapped fields carried a value
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Too few of the expected identifiers are present in the header
    #[error("Schema drift against {version}: missing {}", missing.join(", "))]
    SchemaDrift {
        /// Version of the identifier table that was checked
        version: String,
        /// Identifiers absent from the response
        missing: Vec<String>,
    },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl MeteoSwissError {
    /// Returns true if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::RequestFailed(_)
                | Self::ServiceUnavailable(_)
                | Self::RateLimitExceeded
                | Self::Timeout { .. }
        )
    }
}
