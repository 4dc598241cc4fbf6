//! Cadence timers.
//!
//! Explicit timer loops instead of cron annotations: each cadence sleeps
//! until its next boundary and listens on a shutdown channel, so tests can
//! drive the runner directly without wall-clock waiting.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Days, TimeZone, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::refresher::RealTimeRefresher;
use crate::runner::BatchRunner;

/// Time until the next UTC midnight, when the daily run fires.
pub fn until_next_daily_run(now: DateTime<Utc>) -> Duration {
    let next = Utc.from_utc_datetime(
        &(now.date_naive() + Days::new(1))
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    );
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

/// Time until the first UTC midnight of the next month, when the monthly
/// run fires.
pub fn until_next_monthly_run(now: DateTime<Utc>) -> Duration {
    let date = now.date_naive();
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let next = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

/// Owns the three timer loops: daily, monthly, real-time.
pub struct AggregationScheduler {
    runner: Arc<BatchRunner>,
    refresher: Arc<RealTimeRefresher>,
}

impl AggregationScheduler {
    pub fn new(runner: Arc<BatchRunner>, refresher: Arc<RealTimeRefresher>) -> Self {
        Self { runner, refresher }
    }

    /// Starts all timer loops. They exit when `shutdown` flips to true.
    pub fn start(self: Arc<Self>, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();

        let runner = self.runner.clone();
        let mut rx = shutdown.clone();
        handles.push(tokio::spawn(async move {
            loop {
                let wait = until_next_daily_run(Utc::now());
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {
                        if let Err(e) = runner.run_daily(None).await {
                            error!(error = %e, "daily run aborted");
                        }
                    }
                    _ = rx.changed() => {
                        info!("daily timer stopping");
                        return;
                    }
                }
            }
        }));

        let runner = self.runner.clone();
        let mut rx = shutdown.clone();
        handles.push(tokio::spawn(async move {
            loop {
                let wait = until_next_monthly_run(Utc::now());
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {
                        if let Err(e) = runner.run_monthly(None).await {
                            error!(error = %e, "monthly run aborted");
                        }
                    }
                    _ = rx.changed() => {
                        info!("monthly timer stopping");
                        return;
                    }
                }
            }
        }));

        let refresher = self.refresher.clone();
        let rx = shutdown;
        handles.push(tokio::spawn(async move {
            refresher.run(rx).await;
        }));

        info!("aggregation timers started");
        handles
    }
}
