//! Storelight analytics aggregation engine.
//!
//! Turns raw transactional data (orders, inventory movements, customer
//! events) into per-store, per-period metrics snapshots on daily and monthly
//! cadences, plus a short-window real-time variant. The surrounding admin
//! API provides the data source implementations and serves the results; this
//! crate owns scheduling, computation, and snapshot persistence semantics.
//!
//! ```ignore
//! let engine = Engine::new(registry, orders, inventory, events, snapshots, load_config()?);
//! let handles = engine.start_timers();
//! runtime::shutdown_signal().await;
//! engine.shutdown();
//! ```

pub mod config;
pub mod runtime;

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use collector::Collector;
use datasources::{
    CustomerEventsSource, InventorySource, OrdersSource, SnapshotStore, StoreRegistry,
};
use metrics_core::{Period, RealTimeMetricsSnapshot, Result, SnapshotSet};
use scheduler::{
    AggregationScheduler, BatchResult, BatchRunner, RealTimeRefresher, RunState,
};

pub use config::{load_config, EngineConfig};

/// The assembled aggregation engine: collector, batch runner, and real-time
/// refresher behind the operations the admin API consumes.
pub struct Engine {
    runner: Arc<BatchRunner>,
    refresher: Arc<RealTimeRefresher>,
    snapshots: Arc<dyn SnapshotStore>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Engine {
    pub fn new(
        registry: Arc<dyn StoreRegistry>,
        orders: Arc<dyn OrdersSource>,
        inventory: Arc<dyn InventorySource>,
        events: Arc<dyn CustomerEventsSource>,
        snapshots: Arc<dyn SnapshotStore>,
        config: EngineConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let collector = Arc::new(Collector::new(
            orders,
            inventory,
            events,
            config.collector.clone(),
        ));
        let runner = Arc::new(
            BatchRunner::new(
                registry.clone(),
                collector.clone(),
                snapshots.clone(),
                config.scheduler.clone(),
            )
            .with_shutdown(shutdown_rx.clone()),
        );
        let refresher = Arc::new(RealTimeRefresher::new(
            registry,
            collector,
            snapshots.clone(),
            config.scheduler,
        ));
        Self {
            runner,
            refresher,
            snapshots,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Aggregates the given day (previous full day when `None`) for every
    /// active store. Per-store failures are reported in the result, never
    /// as `Err`.
    pub async fn trigger_daily(&self, date: Option<NaiveDate>) -> Result<BatchResult> {
        self.runner.run_daily(date).await
    }

    /// Aggregates the given month (previous full month when `None`).
    pub async fn trigger_monthly(&self, month: Option<(i32, u32)>) -> Result<BatchResult> {
        self.runner.run_monthly(month).await
    }

    /// On-demand aggregation of one store for manual reruns and backfill.
    pub async fn trigger_for_store(&self, store_id: &str, period: Period) -> Result<SnapshotSet> {
        self.runner.run_for_store(store_id, period).await
    }

    /// The live snapshot for one store, if a refresh cycle has run.
    pub async fn latest_real_time(
        &self,
        store_id: &str,
    ) -> Result<Option<RealTimeMetricsSnapshot>> {
        self.snapshots.latest_real_time(store_id).await
    }

    /// Runs one real-time refresh cycle immediately.
    pub async fn refresh_real_time(&self) -> Result<scheduler::RefreshSummary> {
        self.refresher.refresh_all().await
    }

    /// Current batch run state, for observability.
    pub fn run_state(&self) -> RunState {
        self.runner.state()
    }

    /// Starts the daily, monthly, and real-time timer loops.
    pub fn start_timers(&self) -> Vec<JoinHandle<()>> {
        let scheduler = Arc::new(AggregationScheduler::new(
            self.runner.clone(),
            self.refresher.clone(),
        ));
        scheduler.start(self.shutdown_rx.clone())
    }

    /// Signals every timer loop to stop issuing new work. In-flight per-store
    /// units finish or hit their deadlines; nothing is left half-written.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}
