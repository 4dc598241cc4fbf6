//! Inventory source interface.

use async_trait::async_trait;

use metrics_core::{InventoryMovement, Period, Result, StockLevel};

/// Read-only access to stock levels and movements, scoped by store.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Current stock for every tracked SKU of one store.
    async fn current_levels(&self, store_id: &str) -> Result<Vec<StockLevel>>;

    /// Inventory movements within `period`, for turnover computation.
    async fn movements(&self, store_id: &str, period: Period) -> Result<Vec<InventoryMovement>>;
}
