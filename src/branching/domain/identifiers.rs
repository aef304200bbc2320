//! Validated identifier types for the branching domain.

use super::IdentityError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anchored `[a-z][a-z0-9.-]*` alphabet shared by project and customer names.
static NAME_RE: Lazy<Regex> = Lazy::new(|| compiled(r"\A[a-z][a-z0-9.-]*\z"));

/// Anchored `[a-zA-Z][a-zA-Z0-9._-]*` alphabet for task names.
static TASK_RE: Lazy<Regex> = Lazy::new(|| compiled(r"\A[a-zA-Z][a-zA-Z0-9._-]*\z"));

/// Anchored `<major>.<minor>` version shape.
static VERSION_RE: Lazy<Regex> = Lazy::new(|| compiled(r"\A(\d+)\.(\d+)\z"));

#[expect(
    clippy::expect_used,
    reason = "patterns are compile-time constants; a failure is a programming error"
)]
pub(crate) fn compiled(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid pattern")
}

/// Validated project identifier.
///
/// Projects are top-level namespaces under `<depot>/project/` and match
/// `[a-z][a-z0-9.-]*` exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Project(String);

impl Project {
    /// Creates a validated project identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidProject`] when the value does not match
    /// `[a-z][a-z0-9.-]*` in full.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
        let raw = value.into();
        if NAME_RE.is_match(&raw) {
            Ok(Self(raw))
        } else {
            Err(IdentityError::InvalidProject(raw))
        }
    }

    /// Returns the project name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated customer identifier.
///
/// Customers scope mainlines (`custom/<customer>/main`) and version branches
/// (`custom/<customer>/version/<M.m>`); the alphabet is the same as for
/// projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Customer(String);

impl Customer {
    /// Creates a validated customer identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidCustomer`] when the value does not
    /// match `[a-z][a-z0-9.-]*` in full.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
        let raw = value.into();
        if NAME_RE.is_match(&raw) {
            Ok(Self(raw))
        } else {
            Err(IdentityError::InvalidCustomer(raw))
        }
    }

    /// Returns the customer name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated task name for short-lived development branches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskName(String);

impl TaskName {
    /// Creates a validated task name.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidTask`] when the value does not match
    /// `[a-zA-Z][a-zA-Z0-9._-]*` in full.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
        let raw = value.into();
        if TASK_RE.is_match(&raw) {
            Ok(Self(raw))
        } else {
            Err(IdentityError::InvalidTask(raw))
        }
    }

    /// Returns the task name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `major.minor` release version pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    major: u32,
    minor: u32,
}

impl Version {
    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parses a `<major>.<minor>` string.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidVersion`] when the value is not two
    /// dot-separated decimal numbers, or a component overflows `u32`.
    pub fn parse(value: &str) -> Result<Self, IdentityError> {
        let captures = VERSION_RE
            .captures(value)
            .ok_or_else(|| IdentityError::InvalidVersion(value.to_owned()))?;
        let major = capture_number(&captures, 1, value)?;
        let minor = capture_number(&captures, 2, value)?;
        Ok(Self { major, minor })
    }

    /// Returns the major component.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Returns the minor component.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

fn capture_number(
    captures: &regex::Captures<'_>,
    index: usize,
    original: &str,
) -> Result<u32, IdentityError> {
    captures
        .get(index)
        .ok_or_else(|| IdentityError::InvalidVersion(original.to_owned()))?
        .as_str()
        .parse()
        .map_err(|_| IdentityError::InvalidVersion(original.to_owned()))
}

/// A monotonically increasing revision identifier.
///
/// A changelevel pins a point-in-time state of the depot; branch population
/// always happens from the parent at a pinned changelevel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Changelevel(u64);

impl Changelevel {
    /// Wraps a raw change number.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw change number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Changelevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
