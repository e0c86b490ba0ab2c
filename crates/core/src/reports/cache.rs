//! Monthly report caching using Moka.
//!
//! Only reports for fully elapsed months are cached; their inputs no
//! longer change in the normal flow.

use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

use super::types::{MonthlyReport, ReportPeriod};

/// Default cache capacity (number of months).
const DEFAULT_CACHE_CAPACITY: u64 = 120;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Cache for monthly reports keyed by period.
#[derive(Clone)]
pub struct ReportCache {
    cache: Cache<ReportPeriod, Arc<MonthlyReport>>,
}

impl ReportCache {
    /// Creates a new report cache with default settings.
    ///
    /// Default: 120 months max, 5 minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a new report cache with custom configuration.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Cached report for a period.
    #[must_use]
    pub fn get(&self, period: ReportPeriod) -> Option<MonthlyReport> {
        self.cache.get(&period).map(|report| (*report).clone())
    }

    /// Cache a report.
    pub fn insert(&self, period: ReportPeriod, report: MonthlyReport) {
        self.cache.insert(period, Arc::new(report));
    }

    /// Invalidates all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::new()
    }
}
