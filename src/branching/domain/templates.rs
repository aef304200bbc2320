//! Index-entry rendering for the branch and version index documents.
//!
//! The entries are pure formatting over a frozen [`BranchRequest`] plus the
//! base revision computed by the orchestrator. All request fields reach the
//! template through an explicit context value.

use super::{BranchRequest, Changelevel};
use minijinja::Environment;
use serde::Serialize;
use thiserror::Error;

/// Row inserted into the task-branch index document.
const TASK_BRANCH_ENTRY: &str = r#"
  <tr valign="top">
    <td><code><a href="{{ child }}/">{{ child }}</a></code></td>
    <td><a href="{{ browse }}?@changes+{{ depot }}/project/{{ project }}/{{ child }}/...">Changes</a></td>
    <td>{{ description }}</td>
    <td>In development (<a href="{{ browse }}?@diff2+{{ depot }}/project/{{ project }}/{{ child }}/...@{{ base }}+{{ depot }}/project/{{ project }}/{{ child }}/...">diffs</a>).</td>
  </tr>

"#;

/// Row inserted into the version-branch index document.
const VERSION_BRANCH_ENTRY: &str = r#"
  <tr valign="top">
    <td> <a href="{{ version }}/">{{ version }}</a> </td>
    <td> None. </td>
    <td> <a href="{{ browse }}?@files+{{ depot }}/project/{{ project }}/{{ parent }}/...@{{ changelevel }}">{{ parent }}/...@{{ changelevel }}</a> </td>
    <td>
      {{ description }}
    </td>
    <td>
      <a href="{{ browse }}?@describe+{{ base }}">base</a><br />
      <a href="{{ browse }}?@changes+{{ depot }}/project/{{ project }}/{{ child }}/...">changelists</a>
    </td>
  </tr>

"#;

/// Errors returned while rendering index entries.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The entry template failed to render.
    #[error("failed to render index entry: {0}")]
    Render(#[from] minijinja::Error),
}

#[derive(Serialize)]
struct EntryContext {
    depot: String,
    project: String,
    parent: String,
    child: String,
    description: String,
    version: Option<String>,
    changelevel: u64,
    base: u64,
    browse: String,
}

impl EntryContext {
    fn from_request(request: &BranchRequest, base: Changelevel) -> Self {
        Self {
            depot: request.layout().depot.clone(),
            project: request.project().to_string(),
            parent: request.parent().to_string(),
            child: request.child().to_string(),
            description: request.description().to_owned(),
            version: request.version().map(ToString::to_string),
            changelevel: request.changelevel().value(),
            base: base.value(),
            browse: request.layout().browse_url.clone(),
        }
    }
}

/// Renders the task-branch index row for a request.
///
/// # Errors
///
/// Returns [`TemplateError::Render`] when the template fails to render.
pub fn task_entry(request: &BranchRequest, base: Changelevel) -> Result<String, TemplateError> {
    render(TASK_BRANCH_ENTRY, request, base)
}

/// Renders the version-branch index row for a request.
///
/// # Errors
///
/// Returns [`TemplateError::Render`] when the template fails to render.
pub fn version_entry(request: &BranchRequest, base: Changelevel) -> Result<String, TemplateError> {
    render(VERSION_BRANCH_ENTRY, request, base)
}

fn render(
    template: &str,
    request: &BranchRequest,
    base: Changelevel,
) -> Result<String, TemplateError> {
    let env = Environment::new();
    let context = EntryContext::from_request(request, base);
    Ok(env.render_str(template, &context)?)
}
