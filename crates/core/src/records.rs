//! Raw transactional records as read from the external data sources.
//!
//! These are the engine's view of the admin platform's data, scoped to one
//! store and (where applicable) one period. The engine never writes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreId;

/// A store as listed by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    /// Inactive stores are skipped entirely by every scheduled run.
    pub active: bool,
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Whether the order counts toward sales rollups.
    pub fn is_counted(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::Refunded)
    }
}

/// One product line within an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub category_id: String,
    pub quantity: u64,
    pub unit_price: f64,
}

impl LineItem {
    pub fn revenue(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// An order with its line items, as returned by `OrdersSource::query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub store_id: StoreId,
    pub customer_id: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub line_items: Vec<LineItem>,
}

impl Order {
    pub fn total(&self) -> f64 {
        self.line_items.iter().map(LineItem::revenue).sum()
    }
}

/// Current stock for one SKU.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLevel {
    pub sku: String,
    pub quantity: u64,
    /// Per-unit inventory value (cost basis).
    pub unit_value: f64,
    pub category_id: String,
    pub location: String,
}

impl StockLevel {
    pub fn value(&self) -> f64 {
        self.quantity as f64 * self.unit_value
    }
}

/// Direction of an inventory movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Stock received (purchase orders, returns to stock).
    Inbound,
    /// Stock sold or shipped. Contributes to cost of goods sold.
    Outbound,
    /// Manual correction.
    Adjustment,
}

/// One inventory movement within a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryMovement {
    pub sku: String,
    pub kind: MovementKind,
    pub quantity: u64,
    pub unit_cost: f64,
    pub occurred_at: DateTime<Utc>,
}

impl InventoryMovement {
    /// Cost of goods sold contributed by this movement.
    pub fn cogs(&self) -> f64 {
        match self.kind {
            MovementKind::Outbound => self.quantity as f64 * self.unit_cost,
            _ => 0.0,
        }
    }
}

/// Customer-facing event types tracked by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerEventType {
    PageView,
    SessionStart,
    CartAdd,
    CartRemove,
    Checkout,
    Purchase,
}

/// One customer/session event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerEvent {
    pub customer_id: String,
    pub event_type: CustomerEventType,
    pub timestamp: DateTime<Utc>,
    /// Acquisition source attribution ("organic", "paid", "email", ...).
    pub source: String,
    /// Page path for page-view events.
    pub page: Option<String>,
    pub session_id: Option<String>,
    /// Time spent on the page, for page-view events.
    pub duration_secs: Option<f64>,
    /// Monetary value attached to the event (cart value for cart events).
    pub value: Option<f64>,
}

/// Lifetime purchase history for one customer within a store.
///
/// Returned by the typed `OrdersSource::customer_history` query; feeds
/// new/returning classification, purchase frequency, and lifetime value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerHistory {
    pub customer_id: String,
    pub first_order_at: DateTime<Utc>,
    pub last_order_at: DateTime<Utc>,
    pub lifetime_orders: u64,
    pub lifetime_revenue: f64,
}
