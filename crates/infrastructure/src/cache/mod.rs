//! In-process caching
//!
//! A single [`TtlCache`] implementation, instantiated once per data kind by
//! the [`CacheRegistry`] and handed to adapters at construction time.

mod registry;
mod ttl_cache;

pub use registry::CacheRegistry;
pub use ttl_cache::{CacheStats, TtlCache};

/// Build a cache key from the source name and a location fragment
///
/// Keys of different sources or locations never collide as long as the
/// source name contains no `:`.
#[must_use]
pub fn cache_key(source: &str, location: &str) -> String {
    format!("{source}:{location}")
}
