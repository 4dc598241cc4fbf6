//! Real-time metrics refresher.
//!
//! A higher-frequency sibling of the batch runner. Each cycle replaces the
//! single live snapshot per store from a short trailing event window; it is a
//! cache, not a history, so last write wins between consecutive cycles.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info, warn};

use collector::Collector;
use datasources::{SnapshotStore, StoreRegistry};
use metrics_core::{Error, Result};
use telemetry::metrics;

use crate::config::SchedulerConfig;

/// Outcome of one refresh cycle across all active stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshSummary {
    pub refreshed: u64,
    pub errors: u64,
}

/// Maintains the live real-time snapshot for every active store.
pub struct RealTimeRefresher {
    registry: Arc<dyn StoreRegistry>,
    collector: Arc<Collector>,
    snapshots: Arc<dyn SnapshotStore>,
    config: SchedulerConfig,
}

impl RealTimeRefresher {
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
        }
    }

    /// Refreshes every active store once. One store failing never blocks the
    /// others; only a registry failure aborts the cycle.
    pub async fn refresh_all(&self) -> Result<RefreshSummary> {
        let stores = self.registry.list_active().await?;
        let mut summary = RefreshSummary::default();

        for store in stores {
            match self.refresh_store(&store.id).await {
                Ok(()) => {
                    summary.refreshed += 1;
                    metrics().realtime_refreshes.inc();
                }
                Err(e) => {
                    summary.errors += 1;
                    metrics().realtime_failures.inc();
                    warn!(store_id = %store.id, error = %e, "real-time refresh failed");
                }
            }
        }
        debug!(
            refreshed = summary.refreshed,
            errors = summary.errors,
            "refresh cycle complete"
        );
        Ok(summary)
    }

    /// Recomputes and replaces the live snapshot for one store.
    pub async fn refresh_store(&self, store_id: &str) -> Result<()> {
        let snapshot = self
            .collector
            .compute_real_time(store_id, self.config.realtime_window())
            .await?;
        if let Err(violations) = snapshot.check() {
            return Err(Error::computation(
                store_id,
                format!("real-time snapshot out of range: {violations}"),
            ));
        }
        self.snapshots.put_real_time(snapshot).await
    }

    /// Fixed-interval refresh loop; exits when the shutdown signal flips.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.config.realtime_interval());
        info!(
            interval_secs = self.config.realtime_interval_secs,
            window_secs = self.config.realtime_window_secs,
            "real-time refresher started"
        );
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh_all().await {
                        warn!(error = %e, "refresh cycle aborted");
                    }
                }
                _ = shutdown.changed() => {
                    info!("real-time refresher stopping");
                    return;
                }
            }
        }
    }
}
