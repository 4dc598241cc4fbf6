//! Internal metrics collection.
//!
//! Counters accumulate in-memory; the surrounding service snapshots and
//! exports them on whatever cadence it likes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// Histogram for batch and per-store duration tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 10ms, 50ms, 100ms, 500ms, 1s, 5s, 30s, 60s, 300s
    buckets: [AtomicU64; 9],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 9] = [10, 50, 100, 500, 1000, 5000, 30000, 60000, 300000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a duration in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        self.buckets[Self::BUCKET_BOUNDS.len() - 1].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket bounds paired with counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the aggregation engine.
#[derive(Debug, Default)]
pub struct Metrics {
    // Batch runs
    pub batch_runs: Counter,
    pub stores_processed: Counter,
    pub stores_failed: Counter,
    pub stores_retried: Counter,

    // Snapshot persistence
    pub snapshots_upserted: Counter,
    pub snapshot_upsert_errors: Counter,

    // Real-time refresher
    pub realtime_refreshes: Counter,
    pub realtime_failures: Counter,

    // Durations
    pub batch_duration_ms: Histogram,
    pub store_duration_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            batch_runs: self.batch_runs.get(),
            stores_processed: self.stores_processed.get(),
            stores_failed: self.stores_failed.get(),
            stores_retried: self.stores_retried.get(),
            snapshots_upserted: self.snapshots_upserted.get(),
            snapshot_upsert_errors: self.snapshot_upsert_errors.get(),
            realtime_refreshes: self.realtime_refreshes.get(),
            realtime_failures: self.realtime_failures.get(),
            batch_duration_mean_ms: self.batch_duration_ms.mean(),
            store_duration_mean_ms: self.store_duration_ms.mean(),
        }
    }
}

/// A point-in-time view of the engine's metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub batch_runs: u64,
    pub stores_processed: u64,
    pub stores_failed: u64,
    pub stores_retried: u64,
    pub snapshots_upserted: u64,
    pub snapshot_upsert_errors: u64,
    pub realtime_refreshes: u64,
    pub realtime_failures: u64,
    pub batch_duration_mean_ms: f64,
    pub store_duration_mean_ms: f64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
