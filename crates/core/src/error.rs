//! Unified error types for the analytics engine.
//!
//! The taxonomy separates retryable infrastructure failures (data-source
//! reads, snapshot upserts) from computation failures that indicate bad
//! source data. Expected arithmetic edge cases (zero denominators) are not
//! errors anywhere in the engine; they resolve to zero by policy.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Store identifier as issued by the admin platform.
pub type StoreId = String;

/// Which raw-data source an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Registry,
    Orders,
    Inventory,
    CustomerEvents,
    Snapshots,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registry => "registry",
            Self::Orders => "orders",
            Self::Inventory => "inventory",
            Self::CustomerEvents => "customer_events",
            Self::Snapshots => "snapshots",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the analytics engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A raw-data read failed (timeout, connection loss).
    #[error("data source {kind} failed: {message}")]
    DataSource { kind: SourceKind, message: String },

    /// A computation hit an unexpected invalid state (e.g. negative stock).
    #[error("computation failed for store {store_id}: {message}")]
    Computation { store_id: StoreId, message: String },

    /// A snapshot upsert failed.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// A per-store work unit ran past its deadline. Attribution to a single
    /// source is unknowable; the timeout covers the whole read-compute-upsert
    /// unit.
    #[error("store {store_id} exceeded the {timeout_secs}s deadline")]
    DeadlineExceeded { store_id: StoreId, timeout_secs: u64 },

    /// The requested store is unknown to the registry.
    #[error("unknown store: {0}")]
    StoreNotFound(StoreId),

    /// A period could not be constructed (end before start, bad month).
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    /// Startup configuration is invalid. Fatal, never handled per-run.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a data-source error.
    pub fn data_source(kind: SourceKind, msg: impl Into<String>) -> Self {
        Self::DataSource {
            kind,
            message: msg.into(),
        }
    }

    /// Create a computation error.
    pub fn computation(store_id: impl Into<StoreId>, msg: impl Into<String>) -> Self {
        Self::Computation {
            store_id: store_id.into(),
            message: msg.into(),
        }
    }

    pub fn deadline_exceeded(store_id: impl Into<StoreId>, timeout_secs: u64) -> Self {
        Self::DeadlineExceeded {
            store_id: store_id.into(),
            timeout_secs,
        }
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn invalid_period(msg: impl Into<String>) -> Self {
        Self::InvalidPeriod(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the batch runner should retry the failed operation.
    ///
    /// Only infrastructure failures are retryable; recomputing over the same
    /// bad data cannot fix a computation error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DataSource { .. } | Self::Persistence(_))
    }
}
