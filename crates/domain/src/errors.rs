//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Invalid geographic coordinates
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    /// Invalid station identifier
    #[error("Invalid station id: {0}")]
    InvalidStationId(String),

    /// Invalid postal/region code
    #[error("Invalid region code: {0}")]
    InvalidRegionCode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_station_id_message() {
        let err = DomainError::InvalidStationId("b e r".to_string());
        assert_eq!(err.to_string(), "Invalid station id: b e r");
    }

    #[test]
    fn test_invalid_region_code_message() {
        let err = DomainError::InvalidRegionCode("80a1".to_string());
        assert_eq!(err.to_string(), "Invalid region code: 80a1");
    }

    #[test]
    fn test_invalid_coordinates_mentions_bounds() {
        let err = DomainError::InvalidCoordinates;
        assert!(err.to_string().contains("latitude"));
        assert!(err.to_string().contains("longitude"));
    }
}
