//! Real-time (short-window) metrics computation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use metrics_core::{
    round2, CustomerEvent, CustomerEventType, PageViewMetric, RealTimeMetricsSnapshot,
    RealTimeTrafficSource, Result,
};

use crate::customer::normalize_source;

/// Computes the live snapshot for one store from a short trailing window of
/// events. Unlike the historical collectors this is a cache value, not a
/// rollup; `timestamp` marks the refresh instant.
pub fn compute(
    store_id: &str,
    timestamp: DateTime<Utc>,
    events: &[CustomerEvent],
    pending_orders: u64,
) -> Result<RealTimeMetricsSnapshot> {
    let mut users: BTreeSet<&str> = BTreeSet::new();
    let mut sessions: BTreeSet<&str> = BTreeSet::new();
    let mut cart_sessions: BTreeSet<&str> = BTreeSet::new();
    let mut purchasers: BTreeSet<&str> = BTreeSet::new();
    let mut cart_value = 0.0;
    // page -> (views, total seconds)
    let mut pages: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
    // source -> (users, purchasers)
    let mut sources: BTreeMap<String, (BTreeSet<&str>, BTreeSet<&str>)> = BTreeMap::new();

    for event in events {
        users.insert(event.customer_id.as_str());
        if let Some(session) = event.session_id.as_deref() {
            sessions.insert(session);
        }

        let source = sources.entry(normalize_source(&event.source)).or_default();
        source.0.insert(event.customer_id.as_str());

        match event.event_type {
            CustomerEventType::PageView => {
                let page = pages.entry(event.page.as_deref().unwrap_or("/")).or_default();
                page.0 += 1;
                page.1 += event.duration_secs.unwrap_or(0.0);
            }
            CustomerEventType::CartAdd => {
                if let Some(session) = event.session_id.as_deref() {
                    cart_sessions.insert(session);
                }
                cart_value += event.value.unwrap_or(0.0);
            }
            CustomerEventType::CartRemove => {
                cart_value -= event.value.unwrap_or(0.0);
            }
            CustomerEventType::Purchase => {
                purchasers.insert(event.customer_id.as_str());
                source.1.insert(event.customer_id.as_str());
            }
            CustomerEventType::SessionStart | CustomerEventType::Checkout => {}
        }
    }

    let mut page_views: Vec<PageViewMetric> = pages
        .into_iter()
        .map(|(page, (views, total_secs))| PageViewMetric {
            page: page.to_string(),
            views,
            average_time: if views > 0 {
                round2(total_secs / views as f64)
            } else {
                0.0
            },
        })
        .collect();
    // Busiest pages first; the map iteration already breaks ties by path.
    page_views.sort_by(|a, b| b.views.cmp(&a.views));

    let traffic_sources: Vec<RealTimeTrafficSource> = sources
        .into_iter()
        .map(|(source, (source_users, source_purchasers))| {
            let active = source_users.len() as u64;
            RealTimeTrafficSource {
                source,
                active_users: active,
                conversion_rate: rate(source_purchasers.len() as u64, active),
            }
        })
        .collect();

    Ok(RealTimeMetricsSnapshot {
        store_id: store_id.to_string(),
        timestamp,
        active_users: users.len() as u64,
        active_sessions: sessions.len() as u64,
        cart_count: cart_sessions.len() as u64,
        cart_value: round2(cart_value.max(0.0)),
        pending_orders,
        conversion_rate: rate(purchasers.len() as u64, users.len() as u64),
        page_views,
        traffic_sources,
    })
}

fn rate(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        round2(numerator as f64 / denominator as f64 * 100.0)
    } else {
        0.0
    }
}
