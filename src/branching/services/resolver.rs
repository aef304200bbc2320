//! Context resolver: fills every unset field of a branch directive.
//!
//! Deduction is attempted only when the caller omits a field, so explicit
//! input always wins. Validation happens after every deduction path
//! converges, so the naming grammar is the single gate regardless of how the
//! fields were populated. Resolution only reads from the backend; it never
//! writes.

use crate::branching::domain::{
    BranchDirective, BranchRequest, BranchTarget, Changelevel, Child, DepotLayout, IdentityError,
    Parent, Project, TaskName, extract_release_version, match_parent_filespec,
    match_project_filespec,
};
use crate::branching::ports::{BackendError, DepotBackend, Reporter};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while resolving a branch directive.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The current directory is not inside a project tree.
    #[error("can't deduce project from current directory")]
    CannotDeduceProject,

    /// The resolved project does not exist in the depot.
    #[error("no such project: {0}")]
    NoSuchProject(Project),

    /// The current directory is not inside a mainline tree.
    #[error("can't deduce parent branch from {0}")]
    CannotDeduceParent(String),

    /// The caller-specified project disagrees with the current directory.
    #[error("specified project={specified} but current directory belongs to project={deduced}")]
    ProjectMismatch {
        /// Project the caller supplied.
        specified: Project,
        /// Project the current directory belongs to.
        deduced: Project,
    },

    /// A resolved value fails the identity grammar.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The resolved parent branch does not exist in the depot.
    #[error("no such branch: {0}")]
    NoSuchBranch(Parent),

    /// The parent branch has no changes to pin a changelevel to.
    #[error("no changes under {0}")]
    NoChanges(String),

    /// The release marker is absent from the versioned source file.
    #[error("failed to extract version from {0}")]
    VersionExtractionFailed(String),

    /// The child's embedded customer disagrees with the parent's.
    #[error("customer mismatch between {parent} and {child}")]
    CustomerMismatch {
        /// The resolved parent branch.
        parent: Parent,
        /// The resolved child branch.
        child: Child,
    },

    /// A backend query failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Fills and validates branch directives into frozen requests.
#[derive(Clone)]
pub struct ContextResolver<B, C>
where
    B: DepotBackend,
    C: Clock + Send + Sync,
{
    backend: Arc<B>,
    clock: Arc<C>,
    reporter: Arc<dyn Reporter>,
    layout: DepotLayout,
}

impl<B, C> ContextResolver<B, C>
where
    B: DepotBackend,
    C: Clock + Send + Sync,
{
    /// Creates a new context resolver.
    #[must_use]
    pub const fn new(
        backend: Arc<B>,
        clock: Arc<C>,
        reporter: Arc<dyn Reporter>,
        layout: DepotLayout,
    ) -> Self {
        Self {
            backend,
            clock,
            reporter,
            layout,
        }
    }

    /// Resolves a directive into a frozen [`BranchRequest`].
    ///
    /// Runs the deduction steps in strict order and fails fast on the first
    /// contradiction. Resolution is idempotent: the same directive against
    /// the same backend state yields an identical request.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] on the first deduction, validation,
    /// precondition, or backend failure.
    pub async fn resolve(&self, directive: &BranchDirective) -> Result<BranchRequest, ResolveError> {
        let project = self.resolve_project(directive).await?;
        let parent = self.resolve_parent(directive, &project).await?;
        let changelevel = self.resolve_changelevel(directive, &project, &parent).await?;
        let child = self
            .resolve_child(directive, &project, &parent, changelevel)
            .await?;

        if child.customer() != parent.customer() {
            return Err(ResolveError::CustomerMismatch { parent, child });
        }

        let description = directive.description.clone().unwrap_or_else(|| {
            let generated = format!("Branching {parent} to {child}.");
            self.reporter.note(&format!("description={generated}"));
            generated
        });

        Ok(BranchRequest::new(
            self.layout.clone(),
            project,
            parent,
            changelevel,
            child,
            description,
            directive.commit,
        ))
    }

    async fn resolve_project(&self, directive: &BranchDirective) -> Result<Project, ResolveError> {
        let project = match &directive.project {
            Some(name) => Project::new(name.clone())?,
            None => {
                let here = self
                    .current_location()
                    .await?
                    .ok_or(ResolveError::CannotDeduceProject)?;
                let deduced = match_project_filespec(&self.layout.depot, &here)
                    .ok_or(ResolveError::CannotDeduceProject)?;
                self.reporter.note(&format!("project={deduced}"));
                deduced
            }
        };

        let project_root = self.layout.project_path(&project);
        if self.backend.list_directories(&project_root).await?.is_empty() {
            return Err(ResolveError::NoSuchProject(project));
        }
        Ok(project)
    }

    async fn resolve_parent(
        &self,
        directive: &BranchDirective,
        project: &Project,
    ) -> Result<Parent, ResolveError> {
        let parent = match &directive.parent {
            Some(text) => Parent::parse(text)?,
            None => {
                let here = self
                    .current_location()
                    .await?
                    .ok_or_else(|| ResolveError::CannotDeduceParent(".".to_owned()))?;
                let (deduced_project, deduced) =
                    match_parent_filespec(&self.layout.depot, &here)
                        .ok_or_else(|| ResolveError::CannotDeduceParent(here.clone()))?;
                if deduced_project != *project {
                    return Err(ResolveError::ProjectMismatch {
                        specified: project.clone(),
                        deduced: deduced_project,
                    });
                }
                self.reporter.note(&format!("parent={deduced}"));
                deduced
            }
        };

        let parent_root = self.layout.parent_path(project, &parent);
        if self.backend.list_directories(&parent_root).await?.is_empty() {
            return Err(ResolveError::NoSuchBranch(parent));
        }
        Ok(parent)
    }

    async fn resolve_changelevel(
        &self,
        directive: &BranchDirective,
        project: &Project,
        parent: &Parent,
    ) -> Result<Changelevel, ResolveError> {
        if let Some(changelevel) = directive.changelevel {
            return Ok(changelevel);
        }
        let subtree = format!("{}/...", self.layout.parent_path(project, parent));
        let changes = self.backend.list_changes(&subtree, Some(1)).await?;
        let latest = changes
            .first()
            .ok_or_else(|| ResolveError::NoChanges(subtree))?;
        self.reporter
            .note(&format!("changelevel={}", latest.revision));
        Ok(latest.revision)
    }

    async fn resolve_child(
        &self,
        directive: &BranchDirective,
        project: &Project,
        parent: &Parent,
        changelevel: Changelevel,
    ) -> Result<Child, ResolveError> {
        let composed = match &directive.target {
            BranchTarget::Task(name) => {
                let task = TaskName::new(name.clone())?;
                let today = self.clock.utc().date_naive().format("%Y-%m-%d");
                let composed = format!("branch/{today}/{task}");
                self.reporter.note(&format!("child={composed}"));
                composed
            }
            BranchTarget::NextVersion => {
                let filespec = format!(
                    "{}/{}@{changelevel}",
                    self.layout.parent_path(project, parent),
                    self.layout.version_file
                );
                let contents = self.backend.file_contents(&filespec).await?;
                let version = extract_release_version(&contents)
                    .ok_or_else(|| ResolveError::VersionExtractionFailed(filespec))?;
                let composed = match parent.customer() {
                    None => format!("version/{version}"),
                    Some(customer) => format!("custom/{customer}/version/{version}"),
                };
                self.reporter.note(&format!("child={composed}"));
                composed
            }
            BranchTarget::Explicit(text) => text.clone(),
        };

        // The grammar is the single gate: every path converges on a full
        // child parse, including the composed ones.
        Ok(Child::parse(&composed)?)
    }

    async fn current_location(&self) -> Result<Option<String>, ResolveError> {
        let entries = self.backend.list_directories(".").await?;
        Ok(entries.into_iter().next().map(|entry| entry.path))
    }
}
