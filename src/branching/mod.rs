//! Branch identity derivation and idempotent branch creation.
//!
//! The module implements the full branching workflow: validate or deduce a
//! branch identity, freeze it into a [`domain::BranchRequest`], and execute
//! the four orchestration stages (branch spec, population, base revision,
//! registration). Every stage re-derives "already done" from backend state,
//! so re-running after a partial failure is the documented recovery path.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
