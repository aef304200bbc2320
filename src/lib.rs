//! Arborist: automated branch creation for a hierarchical depot.
//!
//! This crate automates the creation of two kinds of branches inside a
//! centrally managed source tree: short-lived *task* branches
//! (`branch/<date>/<task>`) and long-lived *version* branches
//! (`version/<major.minor>`, optionally customer-scoped). It derives branch
//! identity from context, validates it against a fixed naming grammar, and
//! then drives an idempotent sequence of backend operations: branch-spec
//! creation, content population, and documentation-index registration.
//!
//! # Architecture
//!
//! Arborist follows hexagonal architecture principles:
//!
//! - **Domain**: the identity grammar and the immutable branch request
//! - **Ports**: abstract trait interfaces for the version-control backend
//! - **Adapters**: concrete implementations of ports (`p4` CLI, in-memory)
//!
//! # Modules
//!
//! - [`branching`]: branch identity, context resolution, and orchestration

pub mod branching;
