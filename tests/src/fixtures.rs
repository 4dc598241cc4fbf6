//! Record builders shared by the integration tests.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use metrics_core::{
    CustomerEvent, CustomerEventType, CustomerHistory, LineItem, Order, OrderStatus, Period,
    StockLevel, Store,
};

/// The canonical test day, 2025-03-06.
pub fn test_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 6).unwrap()
}

pub fn test_period() -> Period {
    Period::day(test_day())
}

pub fn store(id: &str, active: bool) -> Store {
    Store {
        id: id.into(),
        name: format!("Store {id}"),
        active,
    }
}

pub fn line_item(product: &str, category: &str, quantity: u64, unit_price: f64) -> LineItem {
    LineItem {
        product_id: product.into(),
        category_id: category.into(),
        quantity,
        unit_price,
    }
}

pub fn order(
    id: &str,
    store_id: &str,
    customer: &str,
    created_at: DateTime<Utc>,
    items: Vec<LineItem>,
) -> Order {
    Order {
        id: id.into(),
        store_id: store_id.into(),
        customer_id: customer.into(),
        status: OrderStatus::Paid,
        created_at,
        line_items: items,
    }
}

/// Four paid orders on the test day totalling 1000 in revenue.
pub fn orders_totalling_1000(store_id: &str) -> Vec<Order> {
    let at = |hours: i64| test_period().start + Duration::hours(hours);
    vec![
        order("o1", store_id, "alice", at(1), vec![line_item("p1", "c1", 1, 400.0)]),
        order("o2", store_id, "bob", at(5), vec![line_item("p2", "c1", 2, 100.0)]),
        order("o3", store_id, "carol", at(9), vec![line_item("p1", "c1", 1, 250.0)]),
        order("o4", store_id, "dave", at(13), vec![line_item("p3", "c2", 3, 50.0)]),
    ]
}

pub fn stock_level(sku: &str, quantity: u64, unit_value: f64) -> StockLevel {
    StockLevel {
        sku: sku.into(),
        quantity,
        unit_value,
        category_id: "c1".into(),
        location: "warehouse".into(),
    }
}

pub fn history(customer: &str, first_order_at: DateTime<Utc>, orders: u64, revenue: f64) -> CustomerHistory {
    CustomerHistory {
        customer_id: customer.into(),
        first_order_at,
        last_order_at: test_period().start,
        lifetime_orders: orders,
        lifetime_revenue: revenue,
    }
}

pub fn event(
    customer: &str,
    event_type: CustomerEventType,
    timestamp: DateTime<Utc>,
    source: &str,
) -> CustomerEvent {
    CustomerEvent {
        customer_id: customer.into(),
        event_type,
        timestamp,
        source: source.into(),
        page: Some("/shop".into()),
        session_id: Some(format!("sess-{customer}")),
        duration_secs: Some(20.0),
        value: Some(30.0),
    }
}

/// A timestamp inside February 2025, for monthly-cadence tests.
pub fn in_february(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, day, hour, 0, 0).unwrap()
}
