//! Port contracts for the version-control backend and operator output.
//!
//! Ports define infrastructure-agnostic interfaces used by the resolver,
//! orchestrator, and registration engine.

pub mod depot;
pub mod reporter;

pub use depot::{
    BackendError, BackendResult, BranchSpecForm, Change, ClientForm, DepotBackend, DirEntry,
    EditSession, PopulateRequest, ViewMapping,
};
pub use reporter::Reporter;
