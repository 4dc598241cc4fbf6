//! Store registry interface.

use async_trait::async_trait;

use metrics_core::{Result, Store};

/// Supplies the set of stores and their active flag. Read-only.
#[async_trait]
pub trait StoreRegistry: Send + Sync {
    /// All stores known to the platform, active or not.
    async fn list_stores(&self) -> Result<Vec<Store>>;

    /// Active stores only. Inactive stores are invisible to scheduled runs.
    async fn list_active(&self) -> Result<Vec<Store>> {
        let stores = self.list_stores().await?;
        Ok(stores.into_iter().filter(|s| s.active).collect())
    }

    /// Looks up a single store by id.
    async fn get_store(&self, store_id: &str) -> Result<Option<Store>> {
        let stores = self.list_stores().await?;
        Ok(stores.into_iter().find(|s| s.id == store_id))
    }
}
