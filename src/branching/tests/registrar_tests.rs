//! Tests for the registration engine and its insertion primitives.

use super::helpers::{BRANCH_INDEX, INDEX_TABLE, PUSHES, PUSHES_SEED, add_artifacts, widget_depot};
use crate::branching::adapters::{InMemoryDepot, RecordingReporter};
use crate::branching::services::{
    Insertion, RegisterAction, RegisterSpec, RegistrarError, RegistrationEngine, apply_insertion,
};
use rstest::rstest;
use std::sync::Arc;

// ── Insertion primitives ───────────────────────────────────────────

#[rstest]
fn before_marker_inserts_at_the_first_occurrence_only() {
    let contents = "a\nEND\nb\nEND\n";
    let updated = apply_insertion(
        contents,
        &Insertion::BeforeMarker("END\n".to_owned()),
        "new\n",
    )
    .expect("marker present");
    assert_eq!(updated, "a\nnew\nEND\nb\nEND\n");
}

#[rstest]
fn before_marker_without_a_marker_yields_none() {
    assert!(
        apply_insertion("no closing tag\n", &Insertion::BeforeMarker("END\n".to_owned()), "x")
            .is_none()
    );
}

#[rstest]
#[case("one\n", "one\nrecord\n")]
#[case("one\n\n\n", "one\nrecord\n")]
#[case("one", "one\nrecord\n")]
fn append_at_end_normalises_trailing_newlines(#[case] contents: &str, #[case] expected: &str) {
    let updated =
        apply_insertion(contents, &Insertion::AppendAtEnd, "\nrecord\n").expect("append succeeds");
    assert_eq!(updated, expected);
}

// ── Engine behaviour ───────────────────────────────────────────────

fn engine(
    depot: &InMemoryDepot,
    reporter: &RecordingReporter,
) -> RegistrationEngine<InMemoryDepot> {
    RegistrationEngine::new(Arc::new(depot.clone()), Arc::new(reporter.clone()))
}

fn index_spec(commit: bool) -> RegisterSpec {
    RegisterSpec {
        artifact: BRANCH_INDEX.to_owned(),
        marker: "branch/2024-05-01/foo".to_owned(),
        insertion: Insertion::BeforeMarker("</table>\n".to_owned()),
        text: "  <tr><td>branch/2024-05-01/foo</td></tr>\n".to_owned(),
        description: "Registering branch/2024-05-01/foo.".to_owned(),
        commit,
    }
}

#[tokio::test]
async fn committing_registration_submits_exactly_once() {
    let depot = widget_depot();
    add_artifacts(&depot);
    let reporter = RecordingReporter::new();
    let engine = engine(&depot, &reporter);

    let first = engine.register(&index_spec(true)).await.expect("register");
    assert_eq!(first, RegisterAction::Submitted);
    let head = depot.file_head(BRANCH_INDEX).expect("index present");
    assert!(head.contains("branch/2024-05-01/foo"));

    let second = engine.register(&index_spec(true)).await.expect("register");
    assert_eq!(second, RegisterAction::AlreadyRegistered);
    assert_eq!(depot.submitted(), vec!["Registering branch/2024-05-01/foo."]);
    assert!(reporter.contains("already updated: skipping."));
}

#[tokio::test]
async fn preview_registration_leaves_the_artifact_untouched() {
    let depot = widget_depot();
    add_artifacts(&depot);
    let reporter = RecordingReporter::new();

    let action = engine(&depot, &reporter)
        .register(&index_spec(false))
        .await
        .expect("register");

    assert_eq!(action, RegisterAction::Pending);
    assert_eq!(depot.file_head(BRANCH_INDEX).as_deref(), Some(INDEX_TABLE));
    assert!(depot.submitted().is_empty());
    assert!(reporter.contains(&format!("--yes omitted: skipping submit of {BRANCH_INDEX}")));
}

#[tokio::test]
async fn registration_reports_the_diff() {
    let depot = widget_depot();
    add_artifacts(&depot);
    let reporter = RecordingReporter::new();

    engine(&depot, &reporter)
        .register(&index_spec(false))
        .await
        .expect("register");

    assert!(reporter.contains(&format!("==== {BRANCH_INDEX} ====")));
    assert!(reporter.contains("+   <tr><td>branch/2024-05-01/foo</td></tr>"));
}

#[tokio::test]
async fn missing_marker_is_an_error() {
    let depot = widget_depot();
    depot.add_file(BRANCH_INDEX, 900, "<html>no table here</html>\n");
    let reporter = RecordingReporter::new();

    let result = engine(&depot, &reporter).register(&index_spec(true)).await;

    assert!(matches!(result, Err(RegistrarError::MarkerNotFound(_))));
    assert!(depot.submitted().is_empty());
}

#[tokio::test]
async fn append_registration_preserves_existing_records() {
    let depot = widget_depot();
    add_artifacts(&depot);
    let reporter = RecordingReporter::new();
    let spec = RegisterSpec {
        artifact: PUSHES.to_owned(),
        marker: "version/1.117".to_owned(),
        insertion: Insertion::AppendAtEnd,
        text: "\nwidget-version-1.117\tgit@github.com:Ravenbrook/mps-temporary.git\tversion/1.117\n"
            .to_owned(),
        description: "Registering version/1.117.".to_owned(),
        commit: true,
    };

    let action = engine(&depot, &reporter).register(&spec).await.expect("register");

    assert_eq!(action, RegisterAction::Submitted);
    let head = depot.file_head(PUSHES).expect("pushes present");
    assert!(head.starts_with(PUSHES_SEED.trim_end_matches('\n')));
    assert!(head.ends_with("version/1.117\n"));
}
