//! External interfaces consumed by the analytics engine.
//!
//! Every trait here is an explicit, typed query surface over an
//! externally-owned store. The engine never sees the persistence technology
//! behind them; the admin platform provides the implementations, and the
//! integration tests provide in-memory mocks.

pub mod events;
pub mod inventory;
pub mod orders;
pub mod registry;
pub mod snapshots;

pub use events::CustomerEventsSource;
pub use inventory::InventorySource;
pub use orders::OrdersSource;
pub use registry::StoreRegistry;
pub use snapshots::SnapshotStore;
