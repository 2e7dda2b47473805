//! Periodic data source port

use async_trait::async_trait;

use crate::error::UpdateError;

/// A source that produces one normalized value per update cycle
///
/// Implementations own their transport handle. `close` releases it and is
/// called exactly once when the owning coordinator shuts down.
#[async_trait]
pub trait UpdateSource<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Fetch and normalize a fresh value
    async fn fetch(&self) -> Result<T, UpdateError>;

    /// Release network resources
    async fn close(&self) {}
}
