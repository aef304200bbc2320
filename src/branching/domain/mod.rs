//! Domain model for branch identity and branch requests.
//!
//! The branching domain models the naming grammar for projects, customers,
//! tasks, and versions, the two branch shapes (task and version), and the
//! frozen [`BranchRequest`] that drives orchestration. All infrastructure
//! concerns are kept outside the domain boundary.

mod child;
mod error;
mod grammar;
mod identifiers;
mod layout;
mod parent;
mod request;
mod templates;

pub use child::Child;
pub use error::IdentityError;
pub use grammar::{extract_release_version, match_parent_filespec, match_project_filespec};
pub use identifiers::{Changelevel, Customer, Project, TaskName, Version};
pub use layout::DepotLayout;
pub use parent::Parent;
pub use request::{BranchDirective, BranchRequest, BranchTarget};
pub use templates::{TemplateError, task_entry, version_entry};
