//! Shared test infrastructure: in-memory mocks and record fixtures.

pub mod fixtures;
pub mod harness;
pub mod mocks;
