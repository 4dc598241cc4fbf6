//! Real-time refresher behavior: last write wins, per-store isolation.

use chrono::Utc;
use metrics_core::CustomerEventType;

use integration_tests::fixtures::*;
use integration_tests::harness::harness;

#[tokio::test]
async fn consecutive_refreshes_leave_one_row_with_latest_data() {
    let h = harness(vec![store("A", true)]);

    h.events.set_live(
        "A",
        vec![event("alice", CustomerEventType::PageView, Utc::now(), "organic")],
    );
    h.engine.refresh_real_time().await.unwrap();
    let first = h.engine.latest_real_time("A").await.unwrap().unwrap();
    assert_eq!(first.active_users, 1);

    h.events.set_live(
        "A",
        vec![
            event("alice", CustomerEventType::PageView, Utc::now(), "organic"),
            event("bob", CustomerEventType::PageView, Utc::now(), "organic"),
            event("carol", CustomerEventType::CartAdd, Utc::now(), "email"),
        ],
    );
    h.engine.refresh_real_time().await.unwrap();

    // Exactly one live row, reflecting the most recent cycle.
    let latest = h.engine.latest_real_time("A").await.unwrap().unwrap();
    assert_eq!(latest.active_users, 3);
    assert_eq!(latest.cart_count, 1);
    assert_eq!(latest.cart_value, 30.0);
    assert!(latest.timestamp >= first.timestamp);
}

#[tokio::test]
async fn one_failing_store_does_not_block_the_others() {
    let h = harness(vec![store("A", true), store("B", true)]);
    h.events.set_live(
        "B",
        vec![event("bob", CustomerEventType::PageView, Utc::now(), "organic")],
    );
    // A's pending-order lookup fails on every attempt.
    h.orders.fail_always("A");

    let summary = h.engine.refresh_real_time().await.unwrap();
    assert_eq!(summary.refreshed, 1);
    assert_eq!(summary.errors, 1);
    assert!(h.engine.latest_real_time("B").await.unwrap().is_some());
    assert!(h.engine.latest_real_time("A").await.unwrap().is_none());
}

#[tokio::test]
async fn no_row_exists_before_the_first_cycle() {
    let h = harness(vec![store("A", true)]);
    assert!(h.engine.latest_real_time("A").await.unwrap().is_none());
}

#[tokio::test]
async fn inactive_stores_are_not_refreshed() {
    let h = harness(vec![store("A", false)]);
    h.events.set_live(
        "A",
        vec![event("alice", CustomerEventType::PageView, Utc::now(), "organic")],
    );
    let summary = h.engine.refresh_real_time().await.unwrap();
    assert_eq!(summary.refreshed, 0);
    assert!(h.engine.latest_real_time("A").await.unwrap().is_none());
}
