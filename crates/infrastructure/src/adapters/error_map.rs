//! Integration errors to update-cycle errors

use application::UpdateError;
use integration_meteoswiss::MeteoSwissError;
use integration_openmeteo::OpenMeteoError;

/// Map a station network error to the update-cycle taxonomy
///
/// Transport failures become retryable; a missing upstream asset marks the
/// source unavailable for this location.
pub fn map_meteoswiss_error(err: MeteoSwissError) -> UpdateError {
    match err {
        MeteoSwissError::ConnectionFailed(e)
        | MeteoSwissError::RequestFailed(e)
        | MeteoSwissError::ServiceUnavailable(e) => UpdateError::TransientNetwork(e),
        MeteoSwissError::RateLimitExceeded => {
            UpdateError::transient("MeteoSwiss rate limit exceeded")
        },
        MeteoSwissError::Timeout { timeout_secs } => {
            UpdateError::transient(format!("MeteoSwiss request timed out after {timeout_secs}s"))
        },
        MeteoSwissError::NotFound(e) => UpdateError::SourceUnavailable(e),
        MeteoSwissError::ParseError(e) | MeteoSwissError::Decode(e) => UpdateError::Decode(e),
        MeteoSwissError::SchemaMismatch(e) => UpdateError::SchemaMismatch(e),
        MeteoSwissError::SchemaDrift { version, missing } => {
            UpdateError::SchemaDrift { version, missing }
        },
        MeteoSwissError::ConfigurationError(e) => UpdateError::SourceUnavailable(e),
    }
}

/// Map an open weather API error to the update-cycle taxonomy
pub fn map_openmeteo_error(err: OpenMeteoError) -> UpdateError {
    match err {
        OpenMeteoError::ConnectionFailed(e)
        | OpenMeteoError::RequestFailed(e)
        | OpenMeteoError::ServiceUnavailable(e) => UpdateError::TransientNetwork(e),
        OpenMeteoError::RateLimitExceeded => {
            UpdateError::transient("Open-Meteo rate limit exceeded")
        },
        OpenMeteoError::Timeout { timeout_secs } => {
            UpdateError::transient(format!("Open-Meteo request timed out after {timeout_secs}s"))
        },
        OpenMeteoError::ParseError(e) => UpdateError::Decode(e),
        OpenMeteoError::ConfigurationError(e) => UpdateError::SourceUnavailable(e),
    }
}
