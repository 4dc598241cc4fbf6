//! In-memory mock implementations of the source interfaces.
//!
//! Each mock can be switched into failure mode to exercise retry and
//! isolation behavior, in the same spirit as a flaky production backend:
//! `fail_always` makes every call fail, `fail_times` makes the next N calls
//! fail and then recover.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use datasources::{
    CustomerEventsSource, InventorySource, OrdersSource, SnapshotStore, StoreRegistry,
};
use metrics_core::{
    CustomerEvent, CustomerHistory, Error, InventoryMovement, Order, Period,
    RealTimeMetricsSnapshot, Result, Snapshot, SnapshotKey, SourceKind, StockLevel, Store, StoreId,
};

/// Failure injection shared by every mock source.
#[derive(Default)]
struct FailureMode {
    fail_always: bool,
    fail_times: u32,
}

impl FailureMode {
    /// Consumes one failure budget entry; true when the call should fail.
    fn should_fail(&mut self) -> bool {
        if self.fail_always {
            return true;
        }
        if self.fail_times > 0 {
            self.fail_times -= 1;
            return true;
        }
        false
    }
}

fn source_error(kind: SourceKind) -> Error {
    Error::data_source(kind, "injected failure")
}

/// Registry serving a fixed store list.
#[derive(Default)]
pub struct MockRegistry {
    stores: Mutex<Vec<Store>>,
    failure: Mutex<FailureMode>,
}

impl MockRegistry {
    pub fn with_stores(stores: Vec<Store>) -> Arc<Self> {
        Arc::new(Self {
            stores: Mutex::new(stores),
            failure: Mutex::new(FailureMode::default()),
        })
    }

    pub fn set_fail_always(&self, fail: bool) {
        self.failure.lock().fail_always = fail;
    }
}

#[async_trait]
impl StoreRegistry for MockRegistry {
    async fn list_stores(&self) -> Result<Vec<Store>> {
        if self.failure.lock().should_fail() {
            return Err(source_error(SourceKind::Registry));
        }
        Ok(self.stores.lock().clone())
    }
}

/// Orders source backed by per-store vectors, with optional per-store
/// failure injection and response delay.
#[derive(Default)]
pub struct MockOrders {
    orders: Mutex<HashMap<StoreId, Vec<Order>>>,
    histories: Mutex<HashMap<StoreId, Vec<CustomerHistory>>>,
    failures: Mutex<HashMap<StoreId, FailureMode>>,
    delay: Mutex<Option<Duration>>,
}

impl MockOrders {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_orders(&self, store_id: &str, orders: Vec<Order>) {
        self.orders
            .lock()
            .entry(store_id.to_string())
            .or_default()
            .extend(orders);
    }

    pub fn insert_histories(&self, store_id: &str, histories: Vec<CustomerHistory>) {
        self.histories
            .lock()
            .entry(store_id.to_string())
            .or_default()
            .extend(histories);
    }

    /// Every read for `store_id` fails until cleared.
    pub fn fail_always(&self, store_id: &str) {
        self.failures
            .lock()
            .entry(store_id.to_string())
            .or_default()
            .fail_always = true;
    }

    /// The next `n` reads for `store_id` fail, then reads recover.
    pub fn fail_times(&self, store_id: &str, n: u32) {
        self.failures
            .lock()
            .entry(store_id.to_string())
            .or_default()
            .fail_times = n;
    }

    /// Every read sleeps for `delay` first, to trip per-store deadlines.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock() = delay;
    }

    async fn check(&self, store_id: &str) -> Result<()> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut failures = self.failures.lock();
        if let Some(mode) = failures.get_mut(store_id) {
            if mode.should_fail() {
                return Err(source_error(SourceKind::Orders));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OrdersSource for MockOrders {
    async fn query(&self, store_id: &str, period: Period) -> Result<Vec<Order>> {
        self.check(store_id).await?;
        Ok(self
            .orders
            .lock()
            .get(store_id)
            .map(|orders| {
                orders
                    .iter()
                    .filter(|o| period.contains(o.created_at))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn customer_history(
        &self,
        store_id: &str,
        customer_ids: &[String],
    ) -> Result<Vec<CustomerHistory>> {
        self.check(store_id).await?;
        Ok(self
            .histories
            .lock()
            .get(store_id)
            .map(|histories| {
                histories
                    .iter()
                    .filter(|h| customer_ids.contains(&h.customer_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Inventory source backed by per-store vectors.
#[derive(Default)]
pub struct MockInventory {
    levels: Mutex<HashMap<StoreId, Vec<StockLevel>>>,
    movements: Mutex<HashMap<StoreId, Vec<InventoryMovement>>>,
}

impl MockInventory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_levels(&self, store_id: &str, levels: Vec<StockLevel>) {
        self.levels
            .lock()
            .entry(store_id.to_string())
            .or_default()
            .extend(levels);
    }

    pub fn insert_movements(&self, store_id: &str, movements: Vec<InventoryMovement>) {
        self.movements
            .lock()
            .entry(store_id.to_string())
            .or_default()
            .extend(movements);
    }
}

#[async_trait]
impl InventorySource for MockInventory {
    async fn current_levels(&self, store_id: &str) -> Result<Vec<StockLevel>> {
        Ok(self.levels.lock().get(store_id).cloned().unwrap_or_default())
    }

    async fn movements(&self, store_id: &str, period: Period) -> Result<Vec<InventoryMovement>> {
        Ok(self
            .movements
            .lock()
            .get(store_id)
            .map(|movements| {
                movements
                    .iter()
                    .filter(|m| period.contains(m.occurred_at))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Customer events source; `recent` serves from a separate live buffer so
/// tests can swap the window contents between refresh cycles.
#[derive(Default)]
pub struct MockEvents {
    events: Mutex<HashMap<StoreId, Vec<CustomerEvent>>>,
    live: Mutex<HashMap<StoreId, Vec<CustomerEvent>>>,
}

impl MockEvents {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_events(&self, store_id: &str, events: Vec<CustomerEvent>) {
        self.events
            .lock()
            .entry(store_id.to_string())
            .or_default()
            .extend(events);
    }

    /// Replaces the live window contents for `store_id`.
    pub fn set_live(&self, store_id: &str, events: Vec<CustomerEvent>) {
        self.live.lock().insert(store_id.to_string(), events);
    }
}

#[async_trait]
impl CustomerEventsSource for MockEvents {
    async fn query(&self, store_id: &str, period: Period) -> Result<Vec<CustomerEvent>> {
        Ok(self
            .events
            .lock()
            .get(store_id)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| period.contains(e.timestamp))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn recent(&self, store_id: &str, _window: chrono::Duration) -> Result<Vec<CustomerEvent>> {
        Ok(self.live.lock().get(store_id).cloned().unwrap_or_default())
    }
}

/// In-memory snapshot store with upsert counting.
#[derive(Default)]
pub struct MemorySnapshotStore {
    historical: Mutex<BTreeMap<SnapshotKey, Snapshot>>,
    realtime: Mutex<HashMap<StoreId, RealTimeMetricsSnapshot>>,
    failure: Mutex<FailureMode>,
    upserts: Mutex<u64>,
}

impl MemorySnapshotStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail_always(&self, fail: bool) {
        self.failure.lock().fail_always = fail;
    }

    /// Total historical upserts, including overwrites.
    pub fn upsert_count(&self) -> u64 {
        *self.upserts.lock()
    }

    /// Number of distinct historical rows.
    pub fn len(&self) -> usize {
        self.historical.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All historical snapshots persisted for one store, any family.
    pub fn snapshots_for(&self, store_id: &str) -> Vec<Snapshot> {
        self.historical
            .lock()
            .values()
            .filter(|s| s.store_id() == store_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn upsert(&self, snapshot: Snapshot) -> Result<()> {
        if self.failure.lock().should_fail() {
            return Err(Error::persistence("injected upsert failure"));
        }
        *self.upserts.lock() += 1;
        self.historical.lock().insert(snapshot.key(), snapshot);
        Ok(())
    }

    async fn get(&self, key: &SnapshotKey) -> Result<Option<Snapshot>> {
        Ok(self.historical.lock().get(key).cloned())
    }

    async fn put_real_time(&self, snapshot: RealTimeMetricsSnapshot) -> Result<()> {
        if self.failure.lock().should_fail() {
            return Err(Error::persistence("injected upsert failure"));
        }
        self.realtime
            .lock()
            .insert(snapshot.store_id.clone(), snapshot);
        Ok(())
    }

    async fn latest_real_time(&self, store_id: &str) -> Result<Option<RealTimeMetricsSnapshot>> {
        Ok(self.realtime.lock().get(store_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn failure_budget_recovers() {
        let orders = MockOrders::new();
        orders.fail_times("A", 1);
        let period = Period::day(chrono::NaiveDate::from_ymd_opt(2025, 3, 6).unwrap());
        assert!(orders.query("A", period).await.is_err());
        assert!(orders.query("A", period).await.is_ok());
    }

    #[tokio::test]
    async fn realtime_rows_replace() {
        let store = MemorySnapshotStore::new();
        let mut snap = RealTimeMetricsSnapshot {
            store_id: "A".into(),
            timestamp: Utc::now(),
            active_users: 1,
            active_sessions: 1,
            cart_count: 0,
            cart_value: 0.0,
            pending_orders: 0,
            conversion_rate: 0.0,
            page_views: vec![],
            traffic_sources: vec![],
        };
        store.put_real_time(snap.clone()).await.unwrap();
        snap.active_users = 7;
        store.put_real_time(snap).await.unwrap();
        let latest = store.latest_real_time("A").await.unwrap().unwrap();
        assert_eq!(latest.active_users, 7);
    }
}
