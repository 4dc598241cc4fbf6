//! Batch aggregation runner.
//!
//! Fans out per-store work through a bounded pool, isolates per-store
//! failures, and reports a `BatchResult`. A per-store unit is internally
//! sequential (read, compute, upsert) and carries its own deadline; exceeding
//! it aborts only that unit.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{error, info, warn};

use collector::Collector;
use datasources::{SnapshotStore, StoreRegistry};
use metrics_core::{Cadence, Error, Period, Result, Snapshot, SnapshotSet, StoreId};
use telemetry::{health, metrics};

use crate::batch::{BatchResult, RunState};
use crate::config::SchedulerConfig;

/// Drives periodic and on-demand aggregation runs.
pub struct BatchRunner {
    registry: Arc<dyn StoreRegistry>,
    collector: Arc<Collector>,
    snapshots: Arc<dyn SnapshotStore>,
    config: SchedulerConfig,
    state: RwLock<RunState>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl BatchRunner {
    pub fn new(
        registry: Arc<dyn StoreRegistry>,
        collector: Arc<Collector>,
        snapshots: Arc<dyn SnapshotStore>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            registry,
            collector,
            snapshots,
            config,
            state: RwLock::new(RunState::Idle),
            shutdown: None,
        }
    }

    /// Attaches a shutdown signal. Once it flips, no new per-store work is
    /// issued; in-flight units finish or hit their own deadlines.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Current run state, for observability.
    pub fn state(&self) -> RunState {
        self.state.read().clone()
    }

    /// Aggregates the given day, or the previous full day, for every active
    /// store. Per-store failures land in the result, never in `Err`; only a
    /// registry failure aborts the whole run.
    pub async fn run_daily(&self, date: Option<NaiveDate>) -> Result<BatchResult> {
        let period = match date {
            Some(d) => Period::day(d),
            None => Period::previous_day(Utc::now()),
        };
        self.run_batch(Cadence::Daily, period).await
    }

    /// Aggregates the given calendar month, or the previous full month.
    pub async fn run_monthly(&self, month: Option<(i32, u32)>) -> Result<BatchResult> {
        let period = match month {
            Some((year, month)) => Period::month(year, month)?,
            None => Period::previous_month(Utc::now()),
        };
        self.run_batch(Cadence::Monthly, period).await
    }

    /// On-demand run for one store. Propagates failure, since there is no
    /// batch to continue. The store may be inactive; manual backfill is the
    /// operator's call.
    pub async fn run_for_store(&self, store_id: &str, period: Period) -> Result<SnapshotSet> {
        let store = self
            .registry
            .get_store(store_id)
            .await?
            .ok_or_else(|| Error::StoreNotFound(store_id.to_string()))?;

        info!(store_id = %store.id, period = %period.label(), "on-demand aggregation");
        let unit = process_store(
            self.collector.clone(),
            self.snapshots.clone(),
            self.config.clone(),
            store.id.clone(),
            period,
        );
        match timeout(self.config.store_timeout(), unit).await {
            Ok(result) => result,
            Err(_) => Err(Error::deadline_exceeded(
                store.id,
                self.config.store_timeout_secs,
            )),
        }
    }

    async fn run_batch(&self, cadence: Cadence, period: Period) -> Result<BatchResult> {
        let started = Instant::now();
        let stores = match self.registry.list_active().await {
            Ok(stores) => {
                health().raw_data.set_healthy();
                stores
            }
            Err(e) => {
                health().raw_data.set_unhealthy(e.to_string());
                return Err(e);
            }
        };

        let mut result = BatchResult::new(cadence, period);
        *self.state.write() = RunState::Running { cadence, period };
        info!(
            run_id = %result.run_id,
            cadence = cadence.as_str(),
            period = %period.label(),
            stores = stores.len(),
            "batch run starting"
        );
        metrics().batch_runs.inc();

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut join_set: JoinSet<(StoreId, std::result::Result<(), String>)> = JoinSet::new();

        for store in stores {
            if self.is_shutting_down() {
                warn!(run_id = %result.run_id, "shutdown requested, not issuing further stores");
                break;
            }
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            let collector = self.collector.clone();
            let snapshots = self.snapshots.clone();
            let config = self.config.clone();
            let deadline = self.config.store_timeout();
            join_set.spawn(async move {
                let _permit = permit;
                let store_started = Instant::now();
                let unit = process_store(collector, snapshots, config, store.id.clone(), period);
                let outcome = match timeout(deadline, unit).await {
                    Ok(Ok(_)) => Ok(()),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err(format!("deadline of {:?} exceeded", deadline)),
                };
                metrics()
                    .store_duration_ms
                    .observe(store_started.elapsed().as_millis() as u64);
                (store.id, outcome)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {
                    metrics().stores_processed.inc();
                    result.record_success();
                }
                Ok((store_id, Err(reason))) => {
                    metrics().stores_failed.inc();
                    error!(run_id = %result.run_id, store_id = %store_id, reason = %reason, "store failed");
                    result.record_failure(store_id, reason);
                }
                Err(join_error) => {
                    metrics().stores_failed.inc();
                    error!(run_id = %result.run_id, error = %join_error, "store task panicked");
                    result.record_failure(
                        format!("unknown-{}", result.errors),
                        join_error.to_string(),
                    );
                }
            }
        }

        metrics()
            .batch_duration_ms
            .observe(started.elapsed().as_millis() as u64);
        info!(
            run_id = %result.run_id,
            processed = result.processed,
            errors = result.errors,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch run complete"
        );
        *self.state.write() = RunState::Completed {
            result: result.clone(),
        };
        Ok(result)
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false)
    }
}

/// One per-store unit: read, compute, validate, upsert. Sequential within the
/// store; the caller supplies concurrency across stores.
async fn process_store(
    collector: Arc<Collector>,
    snapshots: Arc<dyn SnapshotStore>,
    config: SchedulerConfig,
    store_id: StoreId,
    period: Period,
) -> Result<SnapshotSet> {
    let set = retry(&config, || collector.compute_all(&store_id, period)).await?;

    for snapshot in [
        Snapshot::Sales(set.sales.clone()),
        Snapshot::Inventory(set.inventory.clone()),
        Snapshot::Customer(set.customer.clone()),
    ] {
        if let Err(violations) = snapshot.check() {
            return Err(Error::computation(
                &store_id,
                format!("{} snapshot out of range: {violations}", snapshot.family()),
            ));
        }
        let upsert = retry(&config, || snapshots.upsert(snapshot.clone())).await;
        match upsert {
            Ok(()) => {
                health().snapshot_store.set_healthy();
                metrics().snapshots_upserted.inc();
            }
            Err(e) => {
                health().snapshot_store.set_unhealthy(e.to_string());
                metrics().snapshot_upsert_errors.inc();
                return Err(e);
            }
        }
    }
    Ok(set)
}

/// Retries retryable failures with linear backoff. Non-retryable errors
/// (computation, unknown store) surface immediately.
async fn retry<T, F, Fut>(config: &SchedulerConfig, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;
    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff() * attempt;
            warn!(attempt, backoff_ms = backoff.as_millis() as u64, "retrying");
            metrics().stores_retried.inc();
            tokio::time::sleep(backoff).await;
        }
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => last_error = Some(e),
            Err(e) => return Err(e),
        }
    }
    // max_retries >= 0 guarantees at least one attempt recorded an error.
    Err(last_error.unwrap_or_else(|| Error::persistence("retry loop exhausted without error")))
}
