//! StarRocks sink metrics
//!
//! Atomic counters for tracking exporter progress and load health.

use std::sync::atomic::{AtomicU64, Ordering};

use super::response::LoadOutcome;

/// Metrics for the stream load exporter
#[derive(Debug, Default)]
pub struct StreamLoadMetrics {
    /// Records written to staging files
    pub records_staged: AtomicU64,

    /// Records dropped because their type has no table
    pub records_skipped: AtomicU64,

    /// Flush cycles completed
    pub flushes: AtomicU64,

    /// Load requests accepted
    pub loads: AtomicU64,

    /// Accepted loads whose publish timed out
    pub publish_timeouts: AtomicU64,

    /// Rows the store reported as loaded
    pub rows_loaded: AtomicU64,

    /// Rows the store filtered out
    pub rows_filtered: AtomicU64,

    /// Fatal load failures
    pub load_failures: AtomicU64,
}

impl StreamLoadMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            records_staged: AtomicU64::new(0),
            records_skipped: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
            loads: AtomicU64::new(0),
            publish_timeouts: AtomicU64::new(0),
            rows_loaded: AtomicU64::new(0),
            rows_filtered: AtomicU64::new(0),
            load_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_staged(&self) {
        self.records_staged.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_skipped(&self) {
        self.records_skipped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an accepted load
    #[inline]
    pub fn record_load(&self, outcome: LoadOutcome, loaded: u64, filtered: u64) {
        self.loads.fetch_add(1, Ordering::Relaxed);
        if outcome == LoadOutcome::PublishTimeout {
            self.publish_timeouts.fetch_add(1, Ordering::Relaxed);
        }
        self.rows_loaded.fetch_add(loaded, Ordering::Relaxed);
        self.rows_filtered.fetch_add(filtered, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_staged: self.records_staged.load(Ordering::Relaxed),
            records_skipped: self.records_skipped.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            publish_timeouts: self.publish_timeouts.load(Ordering::Relaxed),
            rows_loaded: self.rows_loaded.load(Ordering::Relaxed),
            rows_filtered: self.rows_filtered.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of exporter metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records_staged: u64,
    pub records_skipped: u64,
    pub flushes: u64,
    pub loads: u64,
    pub publish_timeouts: u64,
    pub rows_loaded: u64,
    pub rows_filtered: u64,
    pub load_failures: u64,
}
