//! Batch run results and run-state tracking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use metrics_core::{Cadence, Period, StoreId};

/// Summary of one scheduled or on-demand aggregation pass.
///
/// Per-store failures never abort the batch; they are recorded here for
/// operators to inspect and retry via the single-store trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Correlates every log line of the run.
    pub run_id: Uuid,
    pub cadence: Cadence,
    pub period: Period,
    /// Stores whose snapshots were all computed and persisted.
    pub processed: u64,
    /// Stores that failed after retries.
    pub errors: u64,
    pub store_errors: BTreeMap<StoreId, String>,
}

impl BatchResult {
    pub fn new(cadence: Cadence, period: Period) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            cadence,
            period,
            processed: 0,
            errors: 0,
            store_errors: BTreeMap::new(),
        }
    }

    pub fn record_success(&mut self) {
        self.processed += 1;
    }

    pub fn record_failure(&mut self, store_id: impl Into<StoreId>, reason: impl Into<String>) {
        self.errors += 1;
        self.store_errors.insert(store_id.into(), reason.into());
    }
}

/// Lifecycle of one cadence of the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running { cadence: Cadence, period: Period },
    Completed { result: BatchResult },
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}
