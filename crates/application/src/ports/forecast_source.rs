//! Forecast source port

use async_trait::async_trait;
use domain::{ForecastOrigin, ForecastPoint};
#[cfg(test)]
use mockall::automock;

use crate::error::UpdateError;

/// One link of the forecast fallback chain
///
/// A source that lacks its required input returns
/// `UpdateError::SourceUnavailable` so the chain skips it.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Which upstream this source represents
    fn origin(&self) -> ForecastOrigin;

    /// Fetch hourly points in chronological order
    async fn fetch(&self) -> Result<Vec<ForecastPoint>, UpdateError>;

    /// Release network resources
    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ForecastSource>();
    }
}
