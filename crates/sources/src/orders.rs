//! Orders source interface.

use async_trait::async_trait;

use metrics_core::{CustomerHistory, Order, Period, Result};

/// Read-only access to orders and their line items, scoped by store.
#[async_trait]
pub trait OrdersSource: Send + Sync {
    /// Orders created within `period`, with line items, for one store.
    ///
    /// Returns every status; the collector decides which statuses count.
    async fn query(&self, store_id: &str, period: Period) -> Result<Vec<Order>>;

    /// Lifetime purchase history for the given customers of one store.
    ///
    /// Typed replacement for an ad-hoc query builder: first/last order
    /// timestamps and lifetime totals, computed over all history rather
    /// than any one period.
    async fn customer_history(
        &self,
        store_id: &str,
        customer_ids: &[String],
    ) -> Result<Vec<CustomerHistory>>;
}
