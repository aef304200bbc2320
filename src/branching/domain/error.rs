//! Error types for branch identity validation.

use thiserror::Error;

/// Errors returned while constructing branch identity values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The project name fails the `[a-z][a-z0-9.-]*` grammar.
    #[error("invalid project name: {0}")]
    InvalidProject(String),

    /// The customer name fails the `[a-z][a-z0-9.-]*` grammar.
    #[error("invalid customer name: {0}")]
    InvalidCustomer(String),

    /// The task name fails the `[a-zA-Z][a-zA-Z0-9._-]*` grammar.
    #[error("invalid task: {0}")]
    InvalidTask(String),

    /// The version string is not of the form `<major>.<minor>`.
    #[error("invalid version: {0}")]
    InvalidVersion(String),

    /// The parent branch is neither `master` nor `custom/<customer>/main`.
    #[error("invalid parent branch: {0} (must be master or custom/*/main)")]
    InvalidParent(String),

    /// The child branch matches neither the task nor the version pattern.
    #[error("invalid child: {0}")]
    InvalidChild(String),

    /// The changelevel is not a positive integer.
    #[error("invalid changelevel: {0}")]
    InvalidChangelevel(String),
}
