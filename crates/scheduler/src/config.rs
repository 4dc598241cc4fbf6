//! Scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fan-out, retry, and timer settings for the aggregation scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum per-store units processed concurrently. Sized to avoid
    /// overloading the raw-data store.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Maximum retries for retryable (data source / persistence) failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff between retries, multiplied by the attempt number.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Deadline for one store's read-compute-upsert unit.
    #[serde(default = "default_store_timeout_secs")]
    pub store_timeout_secs: u64,
    /// Tick interval for the real-time refresher.
    #[serde(default = "default_realtime_interval_secs")]
    pub realtime_interval_secs: u64,
    /// Trailing event window the real-time snapshot is computed over.
    #[serde(default = "default_realtime_window_secs")]
    pub realtime_window_secs: u64,
}

fn default_concurrency() -> usize {
    4
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    100
}

fn default_store_timeout_secs() -> u64 {
    30
}

fn default_realtime_interval_secs() -> u64 {
    30
}

fn default_realtime_window_secs() -> u64 {
    300
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            store_timeout_secs: default_store_timeout_secs(),
            realtime_interval_secs: default_realtime_interval_secs(),
            realtime_window_secs: default_realtime_window_secs(),
        }
    }
}

impl SchedulerConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    pub fn realtime_interval(&self) -> Duration {
        Duration::from_secs(self.realtime_interval_secs)
    }

    pub fn realtime_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.realtime_window_secs as i64)
    }
}
