//! Registration engine: update a tracked artifact exactly once.
//!
//! The engine checks whether the artifact already mentions the child branch
//! (the idempotence checkpoint), and only then acquires a scoped edit
//! session over a fresh temporary workspace mapping exactly the one
//! artifact. Within the session it syncs, opens for edit, applies exactly
//! one insertion, reports the diff, and submits only when committing. The
//! workspace is torn down on every exit path.

use crate::branching::ports::{BackendError, DepotBackend, EditSession, Reporter};
use std::sync::Arc;
use thiserror::Error;

/// The two insertion shapes the engine supports.
///
/// These are deliberately narrow primitives, not a general templating or
/// substitution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// Insert the text immediately before the first occurrence of a literal
    /// marker (e.g. a table's closing tag).
    BeforeMarker(String),
    /// Replace any trailing newlines with the text at the end of the
    /// artifact.
    AppendAtEnd,
}

/// One registration request against a tracked artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSpec {
    /// Depot path of the artifact.
    pub artifact: String,
    /// Already-done marker: the artifact mentions this string once the
    /// registration has happened (the child branch path).
    pub marker: String,
    /// Where the text is inserted.
    pub insertion: Insertion,
    /// Text inserted exactly once.
    pub text: String,
    /// Change description used when submitting.
    pub description: String,
    /// Whether the edit is submitted (`false` leaves it pending).
    pub commit: bool,
}

/// What the engine did for one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAction {
    /// The artifact already mentioned the child branch; nothing was done.
    AlreadyRegistered,
    /// The edit was applied and submitted.
    Submitted,
    /// The edit was applied but left pending (preview mode).
    Pending,
}

/// Errors raised by the registration engine.
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// A backend or workspace operation failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The insertion marker was not found in the artifact.
    #[error("insertion marker not found in {0}")]
    MarkerNotFound(String),
}

/// Applies an insertion to artifact contents, exactly once.
///
/// Returns `None` when a [`Insertion::BeforeMarker`] marker is absent.
#[must_use]
pub fn apply_insertion(contents: &str, insertion: &Insertion, text: &str) -> Option<String> {
    match insertion {
        Insertion::BeforeMarker(marker) => contents.find(marker).map(|at| {
            let (head, tail) = contents.split_at(at);
            format!("{head}{text}{tail}")
        }),
        Insertion::AppendAtEnd => Some(format!("{}{text}", contents.trim_end_matches('\n'))),
    }
}

/// Updates tracked artifacts exactly once per child branch.
#[derive(Clone)]
pub struct RegistrationEngine<B>
where
    B: DepotBackend,
{
    backend: Arc<B>,
    reporter: Arc<dyn Reporter>,
}

impl<B> RegistrationEngine<B>
where
    B: DepotBackend,
{
    /// Creates a new registration engine.
    #[must_use]
    pub const fn new(backend: Arc<B>, reporter: Arc<dyn Reporter>) -> Self {
        Self { backend, reporter }
    }

    /// Registers the child branch in one artifact.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrarError::Backend`] when a backend or workspace
    /// operation fails, or [`RegistrarError::MarkerNotFound`] when the
    /// insertion point is absent from the artifact.
    pub async fn register(&self, spec: &RegisterSpec) -> Result<RegisterAction, RegistrarError> {
        let contents = self.backend.file_contents(&spec.artifact).await?;
        if contents.contains(&spec.marker) {
            self.reporter
                .note(&format!("{} already updated: skipping.", spec.artifact));
            return Ok(RegisterAction::AlreadyRegistered);
        }

        let mut session = self.backend.open_edit_session(&spec.artifact).await?;
        let result = self.edit(session.as_mut(), spec).await;
        let closed = session.close().await;
        let action = result?;
        closed?;
        Ok(action)
    }

    async fn edit(
        &self,
        session: &mut dyn EditSession,
        spec: &RegisterSpec,
    ) -> Result<RegisterAction, RegistrarError> {
        session.sync().await?;
        session.open_for_edit().await?;
        let current = session.read_file().await?;
        let updated = apply_insertion(&current, &spec.insertion, &spec.text)
            .ok_or_else(|| RegistrarError::MarkerNotFound(spec.artifact.clone()))?;
        session.write_file(&updated).await?;

        let diff = session.diff().await?;
        for line in diff.lines() {
            self.reporter.note(line);
        }

        if spec.commit {
            session.submit(&spec.description).await?;
            Ok(RegisterAction::Submitted)
        } else {
            self.reporter.note(&format!(
                "--yes omitted: skipping submit of {}",
                spec.artifact
            ));
            Ok(RegisterAction::Pending)
        }
    }
}
