//! Adapter implementations of the branching ports.

pub mod memory;
pub mod p4;

pub use memory::{InMemoryDepot, RecordingReporter};
pub use p4::P4Depot;
