//! Core types, periods, and the snapshot model for the Storelight analytics engine.

pub mod error;
pub mod period;
pub mod records;
pub mod segments;
pub mod snapshot;

pub use error::{Error, Result, SourceKind, StoreId};
pub use period::*;
pub use records::*;
pub use segments::*;
pub use snapshot::*;
