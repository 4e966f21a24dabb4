use async_trait::async_trait;
use cached::{Cached, TimedSizedCache};
use sea_orm::DatabaseConnection;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, trace};

use super::RecordSource;
use crate::error::Result;
use crate::types::{Record, StateFilter};

/// A cache key for the load_records method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateFilterKey {
    states: Vec<String>,
}

impl StateFilterKey {
    fn new(filter: &StateFilter) -> Self {
        Self {
            states: filter.states().to_vec(),
        }
    }
}

/// A caching wrapper for RecordSource implementations.
///
/// Results are memoized per state filter, so repeated recomputation for the
/// same selection (horizon or group changes) reuses the loaded records.
///
/// Features:
/// - Caches load_records results with TTL
/// - One entry per distinct filter
/// - Explicit invalidation through `clear_cache`
/// - Failed loads are not cached
pub struct CachedRecordSource<
    T: RecordSource,
    C: Cached<StateFilterKey, Vec<Record>> = TimedSizedCache<StateFilterKey, Vec<Record>>,
> {
    /// The wrapped source
    inner: T,
    /// Cache for load_records results
    records_cache: Arc<Mutex<C>>,
}

impl<T: RecordSource, C: Cached<StateFilterKey, Vec<Record>>> CachedRecordSource<T, C> {
    /// Creates a new cached source wrapping the provided source with a custom cache store.
    pub fn new_with_store(inner: T, cache_store: C) -> Self {
        Self {
            inner,
            records_cache: Arc::new(Mutex::new(cache_store)),
        }
    }

    /// Clears all cached records.
    ///
    /// This is the explicit refresh: the next load for any filter hits the store.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.records_cache.lock() {
            cache.cache_clear();
            debug!("Record cache cleared");
        }
    }

    /// Returns the current number of cached filters.
    pub fn cache_size(&self) -> usize {
        if let Ok(cache) = self.records_cache.lock() {
            cache.cache_size()
        } else {
            0
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: RecordSource> CachedRecordSource<T, TimedSizedCache<StateFilterKey, Vec<Record>>> {
    /// Creates a new cached source with a size-bounded, time-limited store.
    ///
    /// # Arguments
    /// * `inner` - The source to wrap with caching
    /// * `cache_size` - Maximum number of cached filters
    /// * `ttl` - Time to live for cached entries
    pub fn new(inner: T, cache_size: usize, ttl: Duration) -> Self {
        Self::new_with_store(
            inner,
            TimedSizedCache::with_size_and_lifespan(cache_size, ttl.as_secs()),
        )
    }

    /// Creates a new cached source with default settings (100 filters, 5 minutes).
    pub fn with_defaults(inner: T) -> Self {
        Self::new(inner, 100, Duration::from_secs(300))
    }
}

#[async_trait]
impl<T, C> RecordSource for CachedRecordSource<T, C>
where
    T: RecordSource + Send + Sync,
    C: Cached<StateFilterKey, Vec<Record>> + Send + Sync,
{
    async fn load_records(&self, db: &DatabaseConnection, filter: &StateFilter) -> Result<Vec<Record>> {
        let cache_key = StateFilterKey::new(filter);

        // Try to get from cache first
        if let Ok(mut cache) = self.records_cache.lock() {
            if let Some(records) = cache.cache_get(&cache_key) {
                trace!("Record cache hit for {:?}", cache_key);
                return Ok(records.clone());
            }
        }

        // Not in cache, load from the wrapped source
        let records = self.inner.load_records(db, filter).await?;

        if let Ok(mut cache) = self.records_cache.lock() {
            cache.cache_set(cache_key, records.clone());
        }

        Ok(records)
    }
}
