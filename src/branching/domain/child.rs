//! Child branch identity: the task and version branch shapes.

use super::identifiers::compiled;
use super::{Customer, IdentityError, TaskName, Version};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anchored task-branch shape, `branch/<ISO date>/<task>`.
static TASK_BRANCH_RE: Lazy<Regex> =
    Lazy::new(|| compiled(r"\Abranch/(\d\d\d\d-\d\d-\d\d)/([a-zA-Z][a-zA-Z0-9._-]*)\z"));

/// Anchored version-branch shape, `[custom/<customer>/]version/<M.m>`.
static VERSION_BRANCH_RE: Lazy<Regex> =
    Lazy::new(|| compiled(r"\A(?:custom/([a-z][a-z0-9.-]*)/)?version/(\d+\.\d+)\z"));

/// A validated child branch.
///
/// A child is either a short-lived task branch scoped by creation date, or a
/// long-lived version branch scoped by `major.minor`, optionally
/// customer-specific. `Display` composes the branch path and [`Child::parse`]
/// is its exact inverse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Child {
    /// A task branch, `branch/<date>/<task>`.
    Task {
        /// The date the branch request was created.
        date: NaiveDate,
        /// The task the branch isolates.
        task: TaskName,
    },
    /// A version branch, `version/<M.m>` or `custom/<customer>/version/<M.m>`.
    Version {
        /// Customer scoping the branch, if any.
        customer: Option<Customer>,
        /// The `major.minor` release pair.
        version: Version,
    },
}

impl Child {
    /// Parses a child branch path against the full naming grammar.
    ///
    /// A string matching neither the task nor the version shape is a hard
    /// validation failure, never a silent default. The embedded date must be
    /// a real calendar date.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidChild`] when the value matches neither
    /// branch shape.
    pub fn parse(text: &str) -> Result<Self, IdentityError> {
        if let Some(captures) = TASK_BRANCH_RE.captures(text) {
            return Self::parse_task(&captures, text);
        }
        if let Some(captures) = VERSION_BRANCH_RE.captures(text) {
            return Self::parse_version(&captures, text);
        }
        Err(IdentityError::InvalidChild(text.to_owned()))
    }

    fn parse_task(captures: &regex::Captures<'_>, text: &str) -> Result<Self, IdentityError> {
        let invalid = || IdentityError::InvalidChild(text.to_owned());
        let date_text = captures.get(1).ok_or_else(invalid)?.as_str();
        let date = NaiveDate::parse_from_str(date_text, "%Y-%m-%d").map_err(|_| invalid())?;
        let task = captures
            .get(2)
            .ok_or_else(invalid)
            .and_then(|m| TaskName::new(m.as_str()).map_err(|_| invalid()))?;
        Ok(Self::Task { date, task })
    }

    fn parse_version(captures: &regex::Captures<'_>, text: &str) -> Result<Self, IdentityError> {
        let invalid = || IdentityError::InvalidChild(text.to_owned());
        let customer = captures
            .get(1)
            .map(|m| Customer::new(m.as_str()).map_err(|_| invalid()))
            .transpose()?;
        let version = captures
            .get(2)
            .ok_or_else(invalid)
            .and_then(|m| Version::parse(m.as_str()).map_err(|_| invalid()))?;
        Ok(Self::Version { customer, version })
    }

    /// Returns the customer embedded in the branch path, if any.
    ///
    /// Task branches never embed a customer.
    #[must_use]
    pub const fn customer(&self) -> Option<&Customer> {
        match self {
            Self::Task { .. } => None,
            Self::Version { customer, .. } => customer.as_ref(),
        }
    }

    /// Returns the release version for version branches.
    #[must_use]
    pub const fn version(&self) -> Option<&Version> {
        match self {
            Self::Task { .. } => None,
            Self::Version { version, .. } => Some(version),
        }
    }

    /// Whether this is a version branch (task branches are never registered
    /// in the version index or mirrored).
    #[must_use]
    pub const fn is_version(&self) -> bool {
        matches!(self, Self::Version { .. })
    }
}

impl fmt::Display for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task { date, task } => {
                write!(f, "branch/{}/{task}", date.format("%Y-%m-%d"))
            }
            Self::Version {
                customer: Some(customer),
                version,
            } => write!(f, "custom/{customer}/version/{version}"),
            Self::Version {
                customer: None,
                version,
            } => write!(f, "version/{version}"),
        }
    }
}
