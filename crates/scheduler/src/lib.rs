//! Batch aggregation scheduling for the analytics engine.
//!
//! Components:
//! - `BatchRunner` (daily/monthly/on-demand runs with per-store isolation)
//! - `RealTimeRefresher` (short-window live snapshot maintenance)
//! - `AggregationScheduler` (cadence timers and shutdown wiring)

pub mod batch;
pub mod config;
pub mod refresher;
pub mod runner;
pub mod timer;

pub use batch::{BatchResult, RunState};
pub use config::SchedulerConfig;
pub use refresher::{RealTimeRefresher, RefreshSummary};
pub use runner::BatchRunner;
pub use timer::AggregationScheduler;
