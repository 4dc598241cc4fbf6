//! Per-store metrics computation.
//!
//! The `Collector` reads raw data through the source interfaces and delegates
//! to pure computation functions, one per metric family. The pure functions
//! are deterministic: recomputing a closed historical period over unchanged
//! source data yields a byte-identical snapshot, which is what makes backfill
//! and retry safe.

pub mod config;
pub mod customer;
pub mod inventory;
pub mod realtime;
pub mod sales;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::debug;

use datasources::{CustomerEventsSource, InventorySource, OrdersSource};
use metrics_core::{
    CustomerEventType, CustomerMetricsSnapshot, InventoryMetricsSnapshot, OrderStatus, Period,
    RealTimeMetricsSnapshot, Result, SalesMetricsSnapshot, SnapshotSet,
};

pub use config::CollectorConfig;

/// Computes metric snapshots for one store at a time. No scheduling knowledge.
pub struct Collector {
    orders: Arc<dyn OrdersSource>,
    inventory: Arc<dyn InventorySource>,
    events: Arc<dyn CustomerEventsSource>,
    config: CollectorConfig,
}

impl Collector {
    pub fn new(
        orders: Arc<dyn OrdersSource>,
        inventory: Arc<dyn InventorySource>,
        events: Arc<dyn CustomerEventsSource>,
        config: CollectorConfig,
    ) -> Self {
        Self {
            orders,
            inventory,
            events,
            config,
        }
    }

    /// Sales rollup for one store and period.
    pub async fn compute_sales(
        &self,
        store_id: &str,
        period: Period,
    ) -> Result<SalesMetricsSnapshot> {
        let orders = self.orders.query(store_id, period).await?;
        let events = self.events.query(store_id, period).await?;
        let views = events
            .iter()
            .filter(|e| e.event_type == CustomerEventType::PageView && period.contains(e.timestamp))
            .count() as u64;
        debug!(store_id, period = %period.label(), orders = orders.len(), views, "computing sales");
        sales::compute(store_id, period, &orders, views, &self.config)
    }

    /// Inventory rollup for one store and period.
    pub async fn compute_inventory(
        &self,
        store_id: &str,
        period: Period,
    ) -> Result<InventoryMetricsSnapshot> {
        let levels = self.inventory.current_levels(store_id).await?;
        let movements = self.inventory.movements(store_id, period).await?;
        debug!(
            store_id,
            period = %period.label(),
            skus = levels.len(),
            movements = movements.len(),
            "computing inventory"
        );
        inventory::compute(store_id, period, &levels, &movements, &self.config)
    }

    /// Customer rollup for one store and period.
    pub async fn compute_customer(
        &self,
        store_id: &str,
        period: Period,
    ) -> Result<CustomerMetricsSnapshot> {
        let orders = self.orders.query(store_id, period).await?;
        let previous_orders = self.orders.query(store_id, period.previous()).await?;
        let events = self.events.query(store_id, period).await?;

        let customer_ids: Vec<String> = orders
            .iter()
            .filter(|o| o.status.is_counted() && period.contains(o.created_at))
            .map(|o| o.customer_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let histories = if customer_ids.is_empty() {
            Vec::new()
        } else {
            self.orders.customer_history(store_id, &customer_ids).await?
        };
        debug!(
            store_id,
            period = %period.label(),
            customers = customer_ids.len(),
            "computing customers"
        );
        customer::compute(store_id, period, &orders, &previous_orders, &histories, &events)
    }

    /// All three historical snapshots for one store and period.
    pub async fn compute_all(&self, store_id: &str, period: Period) -> Result<SnapshotSet> {
        Ok(SnapshotSet {
            sales: self.compute_sales(store_id, period).await?,
            inventory: self.compute_inventory(store_id, period).await?,
            customer: self.compute_customer(store_id, period).await?,
        })
    }

    /// Live snapshot from the trailing `window` of events. Last write wins;
    /// no idempotence requirement between consecutive refreshes.
    pub async fn compute_real_time(
        &self,
        store_id: &str,
        window: Duration,
    ) -> Result<RealTimeMetricsSnapshot> {
        let now = Utc::now();
        let events = self.events.recent(store_id, window).await?;
        let recent = Period::new(now - window, now)?;
        let pending_orders = self
            .orders
            .query(store_id, recent)
            .await?
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count() as u64;
        realtime::compute(store_id, now, &events, pending_orders)
    }
}
