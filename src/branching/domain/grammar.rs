//! Filespec matchers and the release-marker extractor.
//!
//! These are pure predicate/parse functions with no side effects. The
//! filespec matchers anchor at a depot prefix and deduce project and parent
//! identity from a depot path such as the one reported for the current
//! working directory.

use super::identifiers::compiled;
use super::{Customer, Parent, Project, Version};
use once_cell::sync::Lazy;
use regex::Regex;

/// Release marker scanned out of the versioned source file, e.g.
/// `#define MPS_RELEASE "release/1.117.0"`.
static RELEASE_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| compiled(r#"(?m)^#define MPS_RELEASE "release/(\d+\.\d+)\.\d+"$"#));

/// Extracts a project identifier from a depot filespec.
///
/// The filespec must begin `<depot>/project/<project>/`; anything shallower
/// or outside the project namespace yields `None`.
#[must_use]
pub fn match_project_filespec(depot: &str, filespec: &str) -> Option<Project> {
    let rest = filespec.strip_prefix(depot)?.strip_prefix("/project/")?;
    let (project, _) = rest.split_once('/')?;
    Project::new(project).ok()
}

/// Extracts project and parent branch from a depot filespec.
///
/// The filespec must continue past the project with `master` or
/// `custom/<customer>/main`, either exactly or followed by deeper components.
#[must_use]
pub fn match_parent_filespec(depot: &str, filespec: &str) -> Option<(Project, Parent)> {
    let rest = filespec.strip_prefix(depot)?.strip_prefix("/project/")?;
    let (project, tail) = rest.split_once('/')?;
    let project = Project::new(project).ok()?;
    let parent = match_parent_tail(tail)?;
    Some((project, parent))
}

fn match_parent_tail(tail: &str) -> Option<Parent> {
    if tail == "master" || tail.strip_prefix("master/").is_some() {
        return Some(Parent::Master);
    }
    let rest = tail.strip_prefix("custom/")?;
    let (customer, after) = rest.split_once('/')?;
    if after != "main" && after.strip_prefix("main/").is_none() {
        return None;
    }
    Customer::new(customer).ok().map(Parent::Custom)
}

/// Extracts the `major.minor` release version from version-file contents.
///
/// Scans for the release marker line and drops the patch component. Returns
/// `None` when the marker is absent; the caller treats that as a hard
/// deduction failure.
#[must_use]
pub fn extract_release_version(contents: &str) -> Option<Version> {
    let captures = RELEASE_MARKER_RE.captures(contents)?;
    let pair = captures.get(1)?.as_str();
    Version::parse(pair).ok()
}
