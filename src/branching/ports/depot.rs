//! Depot backend port: the version-control service contract.

use crate::branching::domain::Changelevel;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// A directory entry in the depot namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Depot path of the directory.
    pub path: String,
}

/// A submitted change touching some depot path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    /// The change number.
    pub revision: Changelevel,
}

/// One source-to-target line of a branch or client view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewMapping {
    /// Depot-side filespec.
    pub source: String,
    /// Target-side filespec.
    pub target: String,
}

/// Form submitted to create a branch spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSpecForm {
    /// Branch-spec name, `<project>/<child>`.
    pub name: String,
    /// Branch-spec description.
    pub description: String,
    /// Parent-to-child view mapping.
    pub view: ViewMapping,
}

/// Form submitted to create a client workspace spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientForm {
    /// Client name.
    pub name: String,
    /// Client description.
    pub description: String,
    /// Filesystem root of the client workspace.
    pub root: String,
    /// Depot-to-client view mapping.
    pub view: ViewMapping,
}

/// Parameters of a populate operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulateRequest {
    /// Preview only: report the prospective changes without committing them.
    pub preview: bool,
    /// Branch spec driving the population.
    pub branch: String,
    /// Description of the populating change.
    pub description: String,
    /// Source filespec, the parent subtree pinned at a changelevel.
    pub source: String,
}

/// The version-control backend, treated as an opaque external service.
///
/// All reads and writes against the depot go through this port; the services
/// hold no state of their own between invocations, so the backend is the
/// single source of truth for "already done" checks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepotBackend: Send + Sync {
    /// Lists directory entries matching a depot path. The special path `"."`
    /// resolves the current working location to its depot path.
    async fn list_directories(&self, path: &str) -> BackendResult<Vec<DirEntry>>;

    /// Lists changes touching a filespec, newest first, optionally limited.
    async fn list_changes(&self, path: &str, limit: Option<usize>) -> BackendResult<Vec<Change>>;

    /// Lists branch-spec names exactly matching the given name.
    async fn list_branch_specs(&self, exact: &str) -> BackendResult<Vec<String>>;

    /// Creates a branch spec.
    async fn create_branch_spec(&self, form: &BranchSpecForm) -> BackendResult<()>;

    /// Lists client names exactly matching the given name.
    async fn list_clients(&self, exact: &str) -> BackendResult<Vec<String>>;

    /// Creates a client workspace spec.
    async fn create_client(&self, form: &ClientForm) -> BackendResult<()>;

    /// Reads the contents of a file, optionally pinned with `@<changelevel>`.
    async fn file_contents(&self, filespec: &str) -> BackendResult<String>;

    /// Materializes the source subtree into the branch target, or previews
    /// the operation without committing when `preview` is set.
    async fn populate(&self, request: &PopulateRequest) -> BackendResult<()>;

    /// Opens a scoped, exclusive editing session against a fresh temporary
    /// workspace mapping exactly the one artifact.
    async fn open_edit_session(&self, artifact: &str) -> BackendResult<Box<dyn EditSession>>;
}

/// A scoped editing session over a single tracked artifact.
///
/// The temporary workspace backing the session must be torn down on every
/// exit path; adapters clean up both in [`EditSession::close`] and on drop.
#[async_trait]
pub trait EditSession: Send {
    /// Fetches the latest artifact content into the local copy.
    async fn sync(&mut self) -> BackendResult<()>;

    /// Marks the local copy open for edit.
    async fn open_for_edit(&mut self) -> BackendResult<()>;

    /// Reads the local copy.
    async fn read_file(&mut self) -> BackendResult<String>;

    /// Overwrites the local copy.
    async fn write_file(&mut self, contents: &str) -> BackendResult<()>;

    /// Computes the diff between the depot head and the local copy.
    async fn diff(&mut self) -> BackendResult<String>;

    /// Submits the pending edit with the given change description.
    async fn submit(&mut self, description: &str) -> BackendResult<()>;

    /// Tears the temporary workspace down.
    async fn close(self: Box<Self>) -> BackendResult<()>;
}

/// Errors returned by depot backend adapters.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend reported a command failure.
    #[error("backend error: {0}")]
    Backend(String),

    /// The backend could not be spawned or spoke an unexpected protocol.
    #[error("backend protocol error: {0}")]
    Protocol(String),

    /// Local I/O inside a scoped workspace failed.
    #[error("workspace i/o error: {0}")]
    Io(#[from] std::io::Error),
}
