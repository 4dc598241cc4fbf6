//! Customer events source interface.

use async_trait::async_trait;
use chrono::Duration;

use metrics_core::{CustomerEvent, Period, Result};

/// Read-only access to customer and session events, scoped by store.
#[async_trait]
pub trait CustomerEventsSource: Send + Sync {
    /// Events within `period` for one store.
    async fn query(&self, store_id: &str, period: Period) -> Result<Vec<CustomerEvent>>;

    /// Events from the trailing `window` up to now, for the real-time
    /// refresher. Implementations may serve this from a hot buffer.
    async fn recent(&self, store_id: &str, window: Duration) -> Result<Vec<CustomerEvent>>;
}
