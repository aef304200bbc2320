//! Depot layout and site-specific artifact locations.

use super::{Parent, Project};

/// Where the depot keeps projects, version files, and tracked artifacts.
///
/// The layout is an explicit value passed into the resolver and orchestrator;
/// there is no ambient global. Defaults mirror the production deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepotLayout {
    /// Root namespace of the version-control backend.
    pub depot: String,
    /// Branch-relative path of the versioned source file carrying the
    /// release marker.
    pub version_file: String,
    /// Project-relative path of the task-branch index document.
    pub branch_index: String,
    /// Project-relative path of the version-branch index document.
    pub version_index: String,
    /// Depot-relative path of the push-tracking artifact.
    pub pushes_file: String,
    /// Remote git target recorded in the push-tracking artifact.
    pub push_remote: String,
    /// Base URL of the repository browser used in index entries.
    pub browse_url: String,
    /// Filesystem root under which mirror-client views are materialized.
    pub mirror_root: String,
}

impl Default for DepotLayout {
    fn default() -> Self {
        Self {
            depot: "//info.ravenbrook.com".to_owned(),
            version_file: "code/version.c".to_owned(),
            branch_index: "branch/index.html".to_owned(),
            version_index: "version/index.html".to_owned(),
            pushes_file: "infosys/robots/git-fusion/etc/pushes".to_owned(),
            push_remote: "git@github.com:Ravenbrook/mps-temporary.git".to_owned(),
            browse_url: "https://info.ravenbrook.com/infosys/cgi/perfbrowse.cgi".to_owned(),
            mirror_root: "/home/git-fusion/.git-fusion/views".to_owned(),
        }
    }
}

impl DepotLayout {
    /// Returns the depot path of a project root.
    #[must_use]
    pub fn project_path(&self, project: &Project) -> String {
        format!("{}/project/{project}", self.depot)
    }

    /// Returns the depot path of a branch root (parent or child) inside a
    /// project.
    #[must_use]
    pub fn branch_path(&self, project: &Project, branch: &impl std::fmt::Display) -> String {
        format!("{}/project/{project}/{branch}", self.depot)
    }

    /// Returns the depot path of the parent branch root.
    #[must_use]
    pub fn parent_path(&self, project: &Project, parent: &Parent) -> String {
        self.branch_path(project, parent)
    }

    /// Returns the depot path of a project-relative document.
    #[must_use]
    pub fn document_path(&self, project: &Project, document: &str) -> String {
        format!("{}/project/{project}/{document}", self.depot)
    }

    /// Returns the depot path of the push-tracking artifact.
    #[must_use]
    pub fn pushes_path(&self) -> String {
        format!("{}/{}", self.depot, self.pushes_file)
    }
}
