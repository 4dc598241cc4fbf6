//! Assembled engine over the in-memory mocks.

use std::sync::Arc;

use analytics_engine::{Engine, EngineConfig};
use metrics_core::Store;

use crate::mocks::{MemorySnapshotStore, MockEvents, MockInventory, MockOrders, MockRegistry};

pub struct Harness {
    pub registry: Arc<MockRegistry>,
    pub orders: Arc<MockOrders>,
    pub inventory: Arc<MockInventory>,
    pub events: Arc<MockEvents>,
    pub snapshots: Arc<MemorySnapshotStore>,
    pub engine: Engine,
}

/// Scheduler settings tuned for tests: fast backoff, few retries.
pub fn quick_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.scheduler.max_retries = 2;
    config.scheduler.retry_backoff_ms = 1;
    config.scheduler.store_timeout_secs = 5;
    config
}

pub fn harness(stores: Vec<Store>) -> Harness {
    harness_with_config(stores, quick_config())
}

pub fn harness_with_config(stores: Vec<Store>, config: EngineConfig) -> Harness {
    let registry = MockRegistry::with_stores(stores);
    let orders = MockOrders::new();
    let inventory = MockInventory::new();
    let events = MockEvents::new();
    let snapshots = MemorySnapshotStore::new();

    let engine = Engine::new(
        registry.clone(),
        orders.clone(),
        inventory.clone(),
        events.clone(),
        snapshots.clone(),
        config,
    );

    Harness {
        registry,
        orders,
        inventory,
        events,
        snapshots,
        engine,
    }
}
