//! Customer metrics computation.

use std::collections::{BTreeMap, BTreeSet};

use metrics_core::{
    round2, CustomerEvent, CustomerEventType, CustomerHistory, CustomerMetricsSnapshot,
    CustomerSegment, Order, Period, Result, SegmentMetric, TrafficSourceMetric,
};

/// Normalizes an acquisition source label. Empty attribution is direct traffic.
pub fn normalize_source(source: &str) -> String {
    let s = source.trim().to_lowercase();
    if s.is_empty() {
        "direct".to_string()
    } else {
        s
    }
}

/// Computes the customer snapshot for one store and period.
///
/// `orders` covers the period itself, `previous_orders` the immediately
/// preceding period of equal length (for retention/churn), `histories` the
/// lifetime stats of every customer active in the period.
pub fn compute(
    store_id: &str,
    period: Period,
    orders: &[Order],
    previous_orders: &[Order],
    histories: &[CustomerHistory],
    events: &[CustomerEvent],
) -> Result<CustomerMetricsSnapshot> {
    let history_by_id: BTreeMap<&str, &CustomerHistory> = histories
        .iter()
        .map(|h| (h.customer_id.as_str(), h))
        .collect();

    let mut active: BTreeSet<&str> = BTreeSet::new();
    // customer -> (orders, revenue) within the period; stands in for the
    // lifetime stats of customers the history query does not know yet.
    let mut period_totals: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
    let mut last_purchase = None;
    for order in orders {
        if !order.status.is_counted() || !period.contains(order.created_at) {
            continue;
        }
        active.insert(order.customer_id.as_str());
        let totals = period_totals.entry(order.customer_id.as_str()).or_default();
        totals.0 += 1;
        totals.1 += order.total();
        if last_purchase.map_or(true, |ts| order.created_at > ts) {
            last_purchase = Some(order.created_at);
        }
    }

    let mut new_customers = 0u64;
    let mut returning_customers = 0u64;
    let mut frequency_sum = 0.0;
    let mut lifetime_sum = 0.0;
    let mut segments: BTreeMap<CustomerSegment, (u64, f64, u64)> = BTreeMap::new();
    for customer_id in &active {
        // A customer without visible history made their first order in this
        // period.
        match history_by_id.get(customer_id) {
            Some(history) => {
                if period.contains(history.first_order_at) {
                    new_customers += 1;
                } else {
                    returning_customers += 1;
                }
                frequency_sum += history.lifetime_orders as f64;
                lifetime_sum += history.lifetime_revenue;

                let segment = CustomerSegment::classify(history, period.end);
                let bucket = segments.entry(segment).or_default();
                bucket.0 += 1;
                bucket.1 += history.lifetime_revenue;
                bucket.2 += history.lifetime_orders;
            }
            None => {
                let (period_orders, period_revenue) = period_totals
                    .get(*customer_id)
                    .copied()
                    .unwrap_or((1, 0.0));
                new_customers += 1;
                frequency_sum += period_orders as f64;
                lifetime_sum += period_revenue;
                let bucket = segments.entry(CustomerSegment::New).or_default();
                bucket.0 += 1;
                bucket.1 += period_revenue;
                bucket.2 += period_orders;
            }
        }
    }

    let total_customers = active.len() as u64;
    let average_purchase_frequency = mean(frequency_sum, total_customers);
    let customer_lifetime_value = mean(lifetime_sum, total_customers);

    let customer_segments: Vec<SegmentMetric> = segments
        .into_iter()
        .map(|(segment, (customers, revenue, order_count))| SegmentMetric {
            segment,
            customers,
            average_order_value: if order_count > 0 {
                round2(revenue / order_count as f64)
            } else {
                0.0
            },
            purchase_frequency: mean(order_count as f64, customers),
        })
        .collect();

    // Traffic attribution: distinct customers per source, converted when a
    // purchase event carries the same source.
    let mut source_visitors: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    let mut source_purchasers: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for event in events {
        if !period.contains(event.timestamp) {
            continue;
        }
        let source = normalize_source(&event.source);
        source_visitors
            .entry(source.clone())
            .or_default()
            .insert(event.customer_id.as_str());
        if event.event_type == CustomerEventType::Purchase {
            source_purchasers
                .entry(source)
                .or_default()
                .insert(event.customer_id.as_str());
        }
    }
    let traffic_sources: Vec<TrafficSourceMetric> = source_visitors
        .into_iter()
        .map(|(source, visitors)| {
            let purchased = source_purchasers
                .get(&source)
                .map(|s| s.len() as u64)
                .unwrap_or(0);
            let customers = visitors.len() as u64;
            TrafficSourceMetric {
                source,
                customers,
                conversion_rate: rate(purchased, customers),
            }
        })
        .collect();

    // Cohort comparison against the preceding period's active set.
    let previous_period = period.previous();
    let previous_active: BTreeSet<&str> = previous_orders
        .iter()
        .filter(|o| o.status.is_counted() && previous_period.contains(o.created_at))
        .map(|o| o.customer_id.as_str())
        .collect();
    let retained = previous_active.intersection(&active).count() as u64;
    let retention_rate = rate(retained, previous_active.len() as u64);
    let churn_rate = if previous_active.is_empty() {
        0.0
    } else {
        round2(100.0 - retention_rate)
    };

    Ok(CustomerMetricsSnapshot {
        store_id: store_id.to_string(),
        period_start: period.start,
        period_end: period.end,
        total_customers,
        new_customers,
        returning_customers,
        average_purchase_frequency,
        customer_lifetime_value,
        traffic_sources,
        customer_segments,
        retention_rate,
        churn_rate,
        last_purchase_date: last_purchase,
    })
}

fn mean(sum: f64, count: u64) -> f64 {
    if count > 0 {
        round2(sum / count as f64)
    } else {
        0.0
    }
}

fn rate(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        round2(numerator as f64 / denominator as f64 * 100.0)
    } else {
        0.0
    }
}
