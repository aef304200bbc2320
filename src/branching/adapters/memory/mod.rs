//! In-memory adapters for tests.

mod depot;
mod reporter;

pub use depot::InMemoryDepot;
pub use reporter::RecordingReporter;
