//! Batch run behavior: isolation, idempotence, retries, deadlines, cadences.

use std::time::Duration;

use chrono::Duration as ChronoDuration;
use metrics_core::{CustomerEventType, Error, MetricFamily, Snapshot};

use integration_tests::fixtures::*;
use integration_tests::harness::{harness, harness_with_config, quick_config};

#[tokio::test]
async fn failing_store_is_isolated_and_inactive_store_is_skipped() {
    let h = harness(vec![store("A", true), store("B", true), store("C", false)]);
    h.orders.insert_orders("A", orders_totalling_1000("A"));
    h.orders.insert_orders("B", orders_totalling_1000("B"));
    h.orders.insert_orders("C", orders_totalling_1000("C"));
    h.orders.fail_always("A");

    let result = h.engine.trigger_daily(Some(test_day())).await.unwrap();

    assert_eq!(result.processed, 1);
    assert_eq!(result.errors, 1);
    assert!(result.store_errors.contains_key("A"));
    // The inactive store is never attempted: neither processed nor failed.
    assert!(!result.store_errors.contains_key("C"));

    assert_eq!(h.snapshots.snapshots_for("B").len(), 3);
    assert!(h.snapshots.snapshots_for("A").is_empty());
    assert!(h.snapshots.snapshots_for("C").is_empty());
}

#[tokio::test]
async fn rerunning_a_period_converges_to_identical_state() {
    let h = harness(vec![store("B", true)]);
    h.orders.insert_orders("B", orders_totalling_1000("B"));

    let first = h.engine.trigger_daily(Some(test_day())).await.unwrap();
    let rows_after_first: Vec<Snapshot> = h.snapshots.snapshots_for("B");
    let second = h.engine.trigger_daily(Some(test_day())).await.unwrap();
    let rows_after_second: Vec<Snapshot> = h.snapshots.snapshots_for("B");

    assert_eq!(first.processed, 1);
    assert_eq!(second.processed, 1);
    // Overwrites, never duplicates: still one row per family.
    assert_eq!(rows_after_first.len(), 3);
    assert_eq!(rows_after_second.len(), 3);
    assert_eq!(rows_after_first, rows_after_second);
    // Six upserts happened in total; the second three replaced the first.
    assert_eq!(h.snapshots.upsert_count(), 6);
}

#[tokio::test]
async fn transient_source_failure_is_retried() {
    let h = harness(vec![store("A", true)]);
    h.orders.insert_orders("A", orders_totalling_1000("A"));
    // Two failures fit inside the configured retry budget.
    h.orders.fail_times("A", 2);

    let result = h.engine.trigger_daily(Some(test_day())).await.unwrap();
    assert_eq!(result.processed, 1);
    assert_eq!(result.errors, 0);
}

#[tokio::test]
async fn store_exceeding_deadline_fails_alone() {
    let mut config = quick_config();
    config.scheduler.store_timeout_secs = 1;
    let h = harness_with_config(vec![store("A", true)], config);
    h.orders.insert_orders("A", orders_totalling_1000("A"));
    h.orders.set_delay(Some(Duration::from_millis(1500)));

    let result = h.engine.trigger_daily(Some(test_day())).await.unwrap();
    assert_eq!(result.processed, 0);
    assert_eq!(result.errors, 1);
    assert!(result.store_errors["A"].contains("deadline"));
}

#[tokio::test]
async fn under_instrumented_store_still_produces_snapshots() {
    // More counted orders than tracked page views: the conversion rate caps
    // at 100 and the store succeeds instead of failing validation forever.
    let h = harness(vec![store("A", true)]);
    h.orders.insert_orders("A", orders_totalling_1000("A"));
    h.events.insert_events(
        "A",
        vec![
            event("alice", CustomerEventType::PageView, test_period().start + ChronoDuration::hours(1), "organic"),
            event("bob", CustomerEventType::PageView, test_period().start + ChronoDuration::hours(2), "organic"),
        ],
    );

    let result = h.engine.trigger_daily(Some(test_day())).await.unwrap();
    assert_eq!(result.processed, 1);
    assert_eq!(result.errors, 0);

    let sales = h
        .snapshots
        .snapshots_for("A")
        .into_iter()
        .find(|s| s.family() == MetricFamily::Sales)
        .unwrap();
    match sales {
        Snapshot::Sales(s) => assert_eq!(s.conversion_rate, 100.0),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn registry_failure_aborts_the_whole_run() {
    let h = harness(vec![store("A", true)]);
    h.registry.set_fail_always(true);
    assert!(h.engine.trigger_daily(Some(test_day())).await.is_err());
}

#[tokio::test]
async fn monthly_run_covers_the_calendar_month() {
    let h = harness(vec![store("A", true)]);
    h.orders.insert_orders(
        "A",
        vec![
            order("feb1", "A", "alice", in_february(3, 10), vec![line_item("p1", "c1", 1, 120.0)]),
            order("feb2", "A", "bob", in_february(27, 22), vec![line_item("p2", "c1", 1, 80.0)]),
            // March order must not leak into February's rollup.
            order(
                "mar",
                "A",
                "carol",
                test_period().start + ChronoDuration::hours(1),
                vec![line_item("p3", "c1", 1, 999.0)],
            ),
        ],
    );

    let result = h.engine.trigger_monthly(Some((2025, 2))).await.unwrap();
    assert_eq!(result.processed, 1);

    let sales = h
        .snapshots
        .snapshots_for("A")
        .into_iter()
        .find(|s| s.family() == MetricFamily::Sales)
        .unwrap();
    match sales {
        Snapshot::Sales(s) => {
            assert_eq!(s.total_revenue, 200.0);
            assert_eq!(s.total_orders, 2);
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn on_demand_run_returns_snapshots_or_propagates() {
    let h = harness(vec![store("A", true), store("B", true)]);
    h.orders.insert_orders("A", orders_totalling_1000("A"));
    h.orders.fail_always("B");

    let set = h.engine.trigger_for_store("A", test_period()).await.unwrap();
    assert_eq!(set.sales.average_order_value, 250.0);

    // Single-store runs propagate failure; there is no batch to continue.
    assert!(h.engine.trigger_for_store("B", test_period()).await.is_err());

    let missing = h.engine.trigger_for_store("nope", test_period()).await;
    assert!(matches!(missing, Err(Error::StoreNotFound(_))));
}

#[tokio::test]
async fn on_demand_deadline_reports_a_deadline_error() {
    let mut config = quick_config();
    config.scheduler.store_timeout_secs = 1;
    let h = harness_with_config(vec![store("A", true)], config);
    h.orders.insert_orders("A", orders_totalling_1000("A"));
    h.orders.set_delay(Some(Duration::from_millis(1500)));

    let result = h.engine.trigger_for_store("A", test_period()).await;
    assert!(matches!(
        result,
        Err(Error::DeadlineExceeded {
            timeout_secs: 1,
            ..
        })
    ));
}

#[tokio::test]
async fn persistence_failure_marks_the_store_failed() {
    let h = harness(vec![store("A", true)]);
    h.orders.insert_orders("A", orders_totalling_1000("A"));
    h.snapshots.set_fail_always(true);

    let result = h.engine.trigger_daily(Some(test_day())).await.unwrap();
    assert_eq!(result.processed, 0);
    assert_eq!(result.errors, 1);
    assert!(h.snapshots.is_empty());
}
