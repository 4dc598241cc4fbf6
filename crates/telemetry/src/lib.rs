//! Internal telemetry for the analytics engine.
//!
//! In-process counters and health flags only; the surrounding admin API
//! decides how to expose them.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
