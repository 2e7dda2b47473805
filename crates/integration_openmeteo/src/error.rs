//! Open-Meteo error types

use thiserror::Error;

/// Errors that can occur while talking to Open-Meteo
#[derive(Debug, Error)]
pub enum OpenMeteoError {
    /// Connection to the service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request was rejected or returned a non-success status
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse the response
    #[error("Parse error: {0}")]
    ParseError(String),

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

    /// Configured timezone is not a known IANA zone
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl OpenMeteoError {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(OpenMeteoError::ConnectionFailed("x".to_string()).is_retryable());
        assert!(OpenMeteoError::RequestFailed("x".to_string()).is_retryable());
        assert!(OpenMeteoError::ServiceUnavailable("x".to_string()).is_retryable());
        assert!(OpenMeteoError::RateLimitExceeded.is_retryable());
        assert!(OpenMeteoError::Timeout { timeout_secs: 30 }.is_retryable());
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!OpenMeteoError::ParseError("x".to_string()).is_retryable());
        assert!(!OpenMeteoError::ConfigurationError("x".to_string()).is_retryable());
    }

    #[test]
    fn test_timeout_display() {
        let err = OpenMeteoError::Timeout { timeout_secs: 12 };
        assert!(err.to_string().contains("12"));
    }
}
