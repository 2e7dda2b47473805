//! In-memory TTL cache
//!
//! Per-entry expiry with lazy eviction on read and an explicit
//! `cleanup_expired` sweep, driven periodically by
//! `CacheRegistry::spawn_sweeper`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

struct Entry<V> {
    value: V,
    created_at: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    /// Expired strictly after `created_at + ttl`
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > self.ttl
    }
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

impl CacheStats {
    /// `hits / (hits + misses)`, zero before the first lookup
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Key/value store with per-entry expiry and hit/miss/eviction counters
///
/// Values are cloned out on read; store `Arc`s for anything large.
/// `get_or_set` does not coalesce concurrent callers: two tasks missing the
/// same key both run their factory and the last write wins.
pub struct TtlCache<V> {
    name: &'static str,
    default_ttl: Duration,
    entries: Mutex<HashMap<String, Entry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("default_ttl", &self.default_ttl)
            .field("entries", &self.entries.lock().len())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .field("evictions", &self.evictions.load(Ordering::Relaxed))
            .finish()
    }
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache
    #[must_use]
    pub fn new(name: &'static str, default_ttl: Duration) -> Self {
        Self {
            name,
            default_ttl,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Value for `key` unless absent or expired
    ///
    /// An expired entry is removed and counted as an eviction.
    #[instrument(skip(self), fields(cache = self.name), level = "debug")]
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache hit");
                return Some(entry.value.clone());
            },
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache entry expired");
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Cache miss");
        None
    }

    /// Store `value`, using the default TTL when `ttl` is `None`
    #[instrument(skip(self, key, value), fields(cache = self.name), level = "debug")]
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.default_ttl);
        debug!(key = %key, ttl_secs = ttl.as_secs(), "Cache set");
        self.entries.lock().insert(
            key,
            Entry {
                value,
                created_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Cached value, or the factory's result written through on a miss
    ///
    /// Factory errors are returned unchanged and nothing is stored.
    pub async fn get_or_set<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        factory: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = factory().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    /// Remove one entry; returns whether it existed
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Remove all expired entries, returning how many were evicted
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();
        if removed > 0 {
            self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
            debug!(cache = self.name, removed, "Expired cache entries removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Current counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    pub fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }
}
