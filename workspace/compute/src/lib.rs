pub mod aggregate;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod insights;
pub mod loader;
pub mod present;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use forecast::AutoForecaster;
use loader::{DatabaseRecordSource, cache::CachedRecordSource};

/// Returns the forecaster used by the service most of the time.
///
/// Exponential smoothing with 95 % intervals once a group has a year of
/// history, a linear trend before that.
pub fn default_forecaster() -> AutoForecaster {
    AutoForecaster::default()
}

/// Returns the database record source wrapped in a per-filter cache.
pub fn default_source(cache_size: usize, ttl: Duration) -> CachedRecordSource<DatabaseRecordSource> {
    CachedRecordSource::new(DatabaseRecordSource::new(), cache_size, ttl)
}
