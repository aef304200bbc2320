//! Unit tests for the identity grammar.

use super::helpers::{DEPOT, VERSION_C};
use crate::branching::domain::{
    Child, Customer, IdentityError, Parent, Project, TaskName, Version, extract_release_version,
    match_parent_filespec, match_project_filespec,
};
use rstest::rstest;

// ── Identifier alphabets ───────────────────────────────────────────

#[rstest]
#[case("widget")]
#[case("mps")]
#[case("a")]
#[case("a-b.c2")]
fn valid_project_names_are_accepted(#[case] input: &str) {
    let project = Project::new(input).expect("valid project");
    assert_eq!(project.as_str(), input);
}

#[rstest]
#[case("")]
#[case("Widget")]
#[case("9widget")]
#[case("-widget")]
#[case("wid get")]
fn invalid_project_names_are_rejected(#[case] input: &str) {
    assert!(matches!(
        Project::new(input),
        Err(IdentityError::InvalidProject(_))
    ));
}

#[rstest]
#[case("9acme")]
#[case("Acme")]
#[case("")]
fn customer_names_must_not_start_with_a_digit_or_uppercase(#[case] input: &str) {
    assert!(matches!(
        Customer::new(input),
        Err(IdentityError::InvalidCustomer(_))
    ));
}

#[rstest]
#[case("foo")]
#[case("Fix_frob-2.1")]
#[case("x")]
fn valid_task_names_are_accepted(#[case] input: &str) {
    let task = TaskName::new(input).expect("valid task");
    assert_eq!(task.as_str(), input);
}

#[rstest]
#[case("9foo")]
#[case("_foo")]
#[case("foo bar")]
#[case("")]
fn invalid_task_names_are_rejected(#[case] input: &str) {
    assert!(matches!(
        TaskName::new(input),
        Err(IdentityError::InvalidTask(_))
    ));
}

#[rstest]
fn version_parses_major_and_minor() {
    let version = Version::parse("1.117").expect("valid version");
    assert_eq!(version.major(), 1);
    assert_eq!(version.minor(), 117);
    assert_eq!(version.to_string(), "1.117");
}

#[rstest]
#[case("117")]
#[case("1.117.0")]
#[case("1.")]
#[case("v1.2")]
fn version_without_exactly_one_dot_is_rejected(#[case] input: &str) {
    assert!(matches!(
        Version::parse(input),
        Err(IdentityError::InvalidVersion(_))
    ));
}

// ── Parent grammar ─────────────────────────────────────────────────

#[rstest]
fn master_parent_has_no_customer() {
    let parent = Parent::parse("master").expect("valid parent");
    assert_eq!(parent, Parent::Master);
    assert!(parent.customer().is_none());
    assert_eq!(parent.to_string(), "master");
}

#[rstest]
fn customer_mainline_parent_extracts_customer() {
    let parent = Parent::parse("custom/acme/main").expect("valid parent");
    assert_eq!(
        parent.customer().map(Customer::as_str),
        Some("acme")
    );
    assert_eq!(parent.to_string(), "custom/acme/main");
}

#[rstest]
#[case("main")]
#[case("custom/Acme/main")]
#[case("custom/9acme/main")]
#[case("custom/acme/master")]
#[case("custom/acme")]
#[case("masterful")]
fn invalid_parents_are_rejected(#[case] input: &str) {
    assert!(matches!(
        Parent::parse(input),
        Err(IdentityError::InvalidParent(_))
    ));
}

// ── Child grammar ──────────────────────────────────────────────────

#[rstest]
#[case("branch/2024-05-01/foo")]
#[case("branch/2014-03-18/version-cleanup.2")]
#[case("version/1.117")]
#[case("custom/acme/version/1.117")]
fn child_round_trips_through_parse_and_display(#[case] input: &str) {
    let child = Child::parse(input).expect("valid child");
    assert_eq!(child.to_string(), input);
}

#[rstest]
fn task_child_extracts_components() {
    let child = Child::parse("branch/2024-05-01/foo").expect("valid child");
    assert!(child.customer().is_none());
    assert!(child.version().is_none());
    assert!(!child.is_version());
}

#[rstest]
fn version_child_extracts_customer_and_version() {
    let child = Child::parse("custom/acme/version/1.117").expect("valid child");
    assert_eq!(child.customer().map(Customer::as_str), Some("acme"));
    assert_eq!(child.version(), Some(&Version::new(1, 117)));
    assert!(child.is_version());
}

#[rstest]
#[case("branch/2024-05-01/9foo")]
#[case("branch/24-05-01/foo")]
#[case("branch/2024-13-40/foo")]
#[case("version/117")]
#[case("version/1.117.0")]
#[case("custom/9acme/version/1.2")]
#[case("custom/acme/branch/2024-05-01/foo")]
#[case("master")]
#[case("")]
fn child_matching_neither_shape_is_a_hard_failure(#[case] input: &str) {
    assert!(matches!(
        Child::parse(input),
        Err(IdentityError::InvalidChild(_))
    ));
}

// ── Filespec matchers ──────────────────────────────────────────────

#[rstest]
fn project_filespec_extracts_project() {
    let filespec = format!("{DEPOT}/project/widget/master/code");
    let project = match_project_filespec(DEPOT, &filespec).expect("match");
    assert_eq!(project.as_str(), "widget");
}

#[rstest]
#[case("//elsewhere/project/widget/master")]
#[case("//info.ravenbrook.com/infosys/widget")]
#[case("//info.ravenbrook.com/project/widget")]
fn project_filespec_requires_depot_prefix_and_deeper_path(#[case] filespec: &str) {
    assert!(match_project_filespec(DEPOT, filespec).is_none());
}

#[rstest]
fn parent_filespec_matches_master_subtree() {
    let filespec = format!("{DEPOT}/project/widget/master/code");
    let (project, parent) = match_parent_filespec(DEPOT, &filespec).expect("match");
    assert_eq!(project.as_str(), "widget");
    assert_eq!(parent, Parent::Master);
}

#[rstest]
fn parent_filespec_matches_customer_mainline() {
    let filespec = format!("{DEPOT}/project/widget/custom/acme/main");
    let (_, parent) = match_parent_filespec(DEPOT, &filespec).expect("match");
    assert_eq!(parent.customer().map(Customer::as_str), Some("acme"));
}

#[rstest]
#[case("//info.ravenbrook.com/project/widget/branch/2024-05-01/foo")]
#[case("//info.ravenbrook.com/project/widget/masterful")]
#[case("//info.ravenbrook.com/project/widget/custom/acme/mainline")]
fn parent_filespec_rejects_non_mainline_locations(#[case] filespec: &str) {
    assert!(match_parent_filespec(DEPOT, filespec).is_none());
}

// ── Release marker ─────────────────────────────────────────────────

#[rstest]
fn release_marker_yields_major_minor() {
    assert_eq!(
        extract_release_version(VERSION_C),
        Some(Version::new(1, 117))
    );
}

#[rstest]
#[case("/* no marker here */\n")]
#[case("#define MPS_RELEASE \"release/1.117\"\n")]
#[case("  #define MPS_RELEASE \"release/1.117.0\"\n")]
fn absent_or_malformed_marker_yields_none(#[case] contents: &str) {
    assert!(extract_release_version(contents).is_none());
}
