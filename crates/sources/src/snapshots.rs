//! Snapshot store interface.

use async_trait::async_trait;

use metrics_core::{RealTimeMetricsSnapshot, Result, Snapshot, SnapshotKey};

/// Upsert/read access to persisted metrics snapshots.
///
/// Historical snapshots are keyed by (store, family, period); an upsert for
/// an existing key replaces the previous row, never duplicates it, and is
/// atomic from the reader's perspective. The real-time snapshot is a single
/// live row per store with last-write-wins semantics.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Inserts or replaces one historical snapshot.
    async fn upsert(&self, snapshot: Snapshot) -> Result<()>;

    /// Reads one historical snapshot, if present.
    async fn get(&self, key: &SnapshotKey) -> Result<Option<Snapshot>>;

    /// Replaces the live real-time row for the snapshot's store.
    async fn put_real_time(&self, snapshot: RealTimeMetricsSnapshot) -> Result<()>;

    /// Reads the live real-time row for one store, if present.
    async fn latest_real_time(&self, store_id: &str) -> Result<Option<RealTimeMetricsSnapshot>>;
}
