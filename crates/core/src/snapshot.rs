//! Persisted metrics snapshots.
//!
//! Field names are part of the contract with downstream dashboard consumers
//! and must not change. One historical snapshot exists per
//! (store, metric family, period); the real-time snapshot is a single live
//! row per store, continuously overwritten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::StoreId;
use crate::period::{MetricFamily, Period};
use crate::segments::CustomerSegment;

/// Rounds a monetary value or rate to two decimal places.
///
/// Applied once at snapshot assembly so recomputation over identical inputs
/// is byte-identical.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Per-product sales rollup, ranked by revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProductSales {
    pub product_id: String,
    pub units_sold: u64,
    #[validate(range(min = 0.0))]
    pub revenue: f64,
}

/// Per-category sales rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CategorySales {
    pub category_id: String,
    pub units_sold: u64,
    #[validate(range(min = 0.0))]
    pub revenue: f64,
}

/// Sales metrics for one store and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SalesMetricsSnapshot {
    pub store_id: StoreId,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    #[validate(range(min = 0.0))]
    pub total_revenue: f64,
    pub total_orders: u64,
    pub total_units_sold: u64,
    #[validate(range(min = 0.0))]
    pub average_order_value: f64,
    /// Capped at the configured top-N; revenue descending, product id
    /// ascending on ties.
    #[validate(nested)]
    pub top_products: Vec<ProductSales>,
    #[validate(nested)]
    pub sales_by_category: Vec<CategorySales>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub conversion_rate: f64,
    pub views: u64,
}

/// Stock held at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LocationStock {
    pub location: String,
    pub items_in_stock: u64,
    #[validate(range(min = 0.0))]
    pub value: f64,
}

/// Per-category inventory rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CategoryInventory {
    pub category_id: String,
    pub items_in_stock: u64,
    #[validate(range(min = 0.0))]
    pub value: f64,
    #[validate(range(min = 0.0))]
    pub turnover_rate: f64,
}

/// Inventory metrics for one store and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InventoryMetricsSnapshot {
    pub store_id: StoreId,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    #[validate(range(min = 0.0))]
    pub total_inventory_value: f64,
    pub total_items_in_stock: u64,
    pub low_stock_items: u64,
    pub out_of_stock_items: u64,
    /// COGS over average inventory value; 0 when the denominator is 0.
    #[validate(range(min = 0.0))]
    pub turnover_rate: f64,
    #[validate(nested)]
    pub stock_by_location: Vec<LocationStock>,
    #[validate(nested)]
    pub category_metrics: Vec<CategoryInventory>,
}

/// Customers attributed to one acquisition source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TrafficSourceMetric {
    pub source: String,
    pub customers: u64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub conversion_rate: f64,
}

/// One customer segment bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SegmentMetric {
    pub segment: CustomerSegment,
    pub customers: u64,
    #[validate(range(min = 0.0))]
    pub average_order_value: f64,
    #[validate(range(min = 0.0))]
    pub purchase_frequency: f64,
}

/// Customer metrics for one store and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CustomerMetricsSnapshot {
    pub store_id: StoreId,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub total_customers: u64,
    pub new_customers: u64,
    pub returning_customers: u64,
    #[validate(range(min = 0.0))]
    pub average_purchase_frequency: f64,
    /// Mean lifetime revenue across the period's customers. A running
    /// total per customer, never reset by period.
    #[validate(range(min = 0.0))]
    pub customer_lifetime_value: f64,
    #[validate(nested)]
    pub traffic_sources: Vec<TrafficSourceMetric>,
    #[validate(nested)]
    pub customer_segments: Vec<SegmentMetric>,
    /// Share of the previous period's active customers who purchased again.
    #[validate(range(min = 0.0, max = 100.0))]
    pub retention_rate: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub churn_rate: f64,
    pub last_purchase_date: Option<DateTime<Utc>>,
}

/// Page-view rollup for the live dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PageViewMetric {
    pub page: String,
    pub views: u64,
    /// Mean seconds on page.
    #[validate(range(min = 0.0))]
    pub average_time: f64,
}

/// Live visitors attributed to one acquisition source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RealTimeTrafficSource {
    pub source: String,
    pub active_users: u64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub conversion_rate: f64,
}

/// The single live metrics row per store. A cache, not a history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RealTimeMetricsSnapshot {
    pub store_id: StoreId,
    pub timestamp: DateTime<Utc>,
    pub active_users: u64,
    pub active_sessions: u64,
    pub cart_count: u64,
    #[validate(range(min = 0.0))]
    pub cart_value: f64,
    pub pending_orders: u64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub conversion_rate: f64,
    #[validate(nested)]
    pub page_views: Vec<PageViewMetric>,
    #[validate(nested)]
    pub traffic_sources: Vec<RealTimeTrafficSource>,
}

impl RealTimeMetricsSnapshot {
    /// Range-checks every field against the snapshot invariants.
    pub fn check(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()
    }
}

/// Identity of one persisted historical snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SnapshotKey {
    pub store_id: StoreId,
    pub family: MetricFamily,
    pub period: Period,
}

/// A historical snapshot of any family, as passed to the snapshot store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Snapshot {
    Sales(SalesMetricsSnapshot),
    Inventory(InventoryMetricsSnapshot),
    Customer(CustomerMetricsSnapshot),
}

impl Snapshot {
    pub fn store_id(&self) -> &str {
        match self {
            Self::Sales(s) => &s.store_id,
            Self::Inventory(s) => &s.store_id,
            Self::Customer(s) => &s.store_id,
        }
    }

    pub fn family(&self) -> MetricFamily {
        match self {
            Self::Sales(_) => MetricFamily::Sales,
            Self::Inventory(_) => MetricFamily::Inventory,
            Self::Customer(_) => MetricFamily::Customer,
        }
    }

    pub fn period(&self) -> Period {
        let (start, end) = match self {
            Self::Sales(s) => (s.period_start, s.period_end),
            Self::Inventory(s) => (s.period_start, s.period_end),
            Self::Customer(s) => (s.period_start, s.period_end),
        };
        Period { start, end }
    }

    pub fn key(&self) -> SnapshotKey {
        SnapshotKey {
            store_id: self.store_id().to_string(),
            family: self.family(),
            period: self.period(),
        }
    }

    /// Range-checks every field against the snapshot invariants.
    pub fn check(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            Self::Sales(s) => s.validate(),
            Self::Inventory(s) => s.validate(),
            Self::Customer(s) => s.validate(),
        }
    }
}

/// All three historical snapshots from a single per-store run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSet {
    pub sales: SalesMetricsSnapshot,
    pub inventory: InventoryMetricsSnapshot,
    pub customer: CustomerMetricsSnapshot,
}
