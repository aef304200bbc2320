//! Caller input and the frozen branch request.

use super::{Changelevel, Child, Customer, DepotLayout, Parent, Project, Version};

/// Which child branch the caller asked for.
///
/// The three request modes are mutually exclusive by construction; the CLI
/// decides the variant once at entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchTarget {
    /// A task branch named after today's date and the given task.
    Task(String),
    /// The next version branch, with the number read from the versioned
    /// source file at the pinned changelevel.
    NextVersion,
    /// A caller-supplied child branch path, used verbatim.
    Explicit(String),
}

/// Partial caller input before context resolution.
///
/// Every `None` field is deduced from the current location in the tree or
/// from backend queries; explicit caller input always wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchDirective {
    /// Project name, if supplied.
    pub project: Option<String>,
    /// Parent branch, if supplied.
    pub parent: Option<String>,
    /// Changelevel to branch at, if supplied.
    pub changelevel: Option<Changelevel>,
    /// Branch-spec description, if supplied.
    pub description: Option<String>,
    /// Requested child branch.
    pub target: BranchTarget,
    /// Whether side effects are applied (`false` = preview).
    pub commit: bool,
}

impl BranchDirective {
    /// Creates a directive with every deducible field unset.
    #[must_use]
    pub const fn new(target: BranchTarget, commit: bool) -> Self {
        Self {
            project: None,
            parent: None,
            changelevel: None,
            description: None,
            target,
            commit,
        }
    }
}

/// A fully resolved, frozen branch request.
///
/// Built once per invocation by the context resolver and never mutated
/// afterwards; the orchestrator derives everything else (base revision,
/// effective commit flag) from backend state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRequest {
    layout: DepotLayout,
    project: Project,
    parent: Parent,
    changelevel: Changelevel,
    child: Child,
    description: String,
    commit: bool,
}

impl BranchRequest {
    /// Freezes a resolved request.
    #[must_use]
    pub const fn new(
        layout: DepotLayout,
        project: Project,
        parent: Parent,
        changelevel: Changelevel,
        child: Child,
        description: String,
        commit: bool,
    ) -> Self {
        Self {
            layout,
            project,
            parent,
            changelevel,
            child,
            description,
            commit,
        }
    }

    /// Returns the depot layout this request resolves against.
    #[must_use]
    pub const fn layout(&self) -> &DepotLayout {
        &self.layout
    }

    /// Returns the project.
    #[must_use]
    pub const fn project(&self) -> &Project {
        &self.project
    }

    /// Returns the parent branch.
    #[must_use]
    pub const fn parent(&self) -> &Parent {
        &self.parent
    }

    /// Returns the customer scoping the parent mainline, if any.
    #[must_use]
    pub const fn customer(&self) -> Option<&Customer> {
        self.parent.customer()
    }

    /// Returns the changelevel the branch is made at.
    #[must_use]
    pub const fn changelevel(&self) -> Changelevel {
        self.changelevel
    }

    /// Returns the child branch.
    #[must_use]
    pub const fn child(&self) -> &Child {
        &self.child
    }

    /// Returns the release version for version branches.
    #[must_use]
    pub const fn version(&self) -> Option<&Version> {
        self.child.version()
    }

    /// Returns the branch-spec description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether side effects are applied.
    #[must_use]
    pub const fn commit(&self) -> bool {
        self.commit
    }

    /// Returns the branch-spec name, `<project>/<child>`.
    #[must_use]
    pub fn branch_name(&self) -> String {
        format!("{}/{}", self.project, self.child)
    }

    /// Returns the depot path of the parent branch root.
    #[must_use]
    pub fn parent_path(&self) -> String {
        self.layout.branch_path(&self.project, &self.parent)
    }

    /// Returns the depot path of the child branch root.
    #[must_use]
    pub fn child_path(&self) -> String {
        self.layout.branch_path(&self.project, &self.child)
    }

    /// Returns the populate source, the parent subtree pinned at the
    /// request's changelevel.
    #[must_use]
    pub fn populate_source(&self) -> String {
        format!("{}/...@{}", self.parent_path(), self.changelevel)
    }

    /// Returns the generated populate/branch sentence.
    #[must_use]
    pub fn branching_sentence(&self) -> String {
        format!("Branching {} to {}.", self.parent, self.child)
    }
}
