//! In-memory depot backend for tests.
//!
//! Models just enough of the backend contract to exercise the resolver,
//! orchestrator, and registration engine: a directory namespace, per-path
//! file revisions, a global change list, branch-spec and client registries,
//! and one-file edit sessions. Mutating calls are counted so idempotence
//! properties can be asserted directly.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use crate::branching::domain::Changelevel;
use crate::branching::ports::{
    BackendError, BackendResult, BranchSpecForm, Change, ClientForm, DepotBackend, DirEntry,
    EditSession, PopulateRequest,
};

/// Thread-safe in-memory depot backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDepot {
    state: Arc<RwLock<DepotState>>,
}

#[derive(Debug, Default)]
struct DepotState {
    cwd: Option<String>,
    directories: BTreeSet<String>,
    files: HashMap<String, Vec<(u64, String)>>,
    changes: Vec<(u64, Vec<String>)>,
    branch_specs: HashMap<String, BranchSpecForm>,
    clients: HashMap<String, ClientForm>,
    next_change: u64,
    branch_spec_creates: u64,
    populate_calls: u64,
    populate_previews: u64,
    submitted: Vec<String>,
}

fn poisoned(err: impl std::fmt::Display) -> BackendError {
    BackendError::Protocol(err.to_string())
}

fn strip_subtree(filespec: &str) -> &str {
    filespec.strip_suffix("/...").unwrap_or(filespec)
}

fn touches(change_paths: &[String], prefix: &str) -> bool {
    change_paths
        .iter()
        .any(|path| path == prefix || path.strip_prefix(prefix).is_some_and(|r| r.starts_with('/')))
}

impl InMemoryDepot {
    /// Creates an empty depot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the depot path the special query `"."` resolves to.
    pub fn set_cwd(&self, path: &str) {
        if let Ok(mut state) = self.state.write() {
            state.cwd = Some(path.to_owned());
        }
    }

    /// Adds a directory to the depot namespace.
    pub fn add_directory(&self, path: &str) {
        if let Ok(mut state) = self.state.write() {
            state.directories.insert(path.to_owned());
        }
    }

    /// Adds a file revision and records a change touching it.
    pub fn add_file(&self, path: &str, revision: u64, contents: &str) {
        if let Ok(mut state) = self.state.write() {
            state
                .files
                .entry(path.to_owned())
                .or_default()
                .push((revision, contents.to_owned()));
            state.changes.push((revision, vec![path.to_owned()]));
            state.next_change = state.next_change.max(revision.saturating_add(1));
        }
    }

    /// Records a change touching the given paths.
    pub fn record_change(&self, revision: u64, paths: &[&str]) {
        if let Ok(mut state) = self.state.write() {
            state
                .changes
                .push((revision, paths.iter().map(|p| (*p).to_owned()).collect()));
            state.next_change = state.next_change.max(revision.saturating_add(1));
        }
    }

    /// Number of branch specs created through the port.
    #[must_use]
    pub fn branch_spec_creates(&self) -> u64 {
        self.state.read().map(|s| s.branch_spec_creates).unwrap_or_default()
    }

    /// Number of committing populate calls.
    #[must_use]
    pub fn populate_calls(&self) -> u64 {
        self.state.read().map(|s| s.populate_calls).unwrap_or_default()
    }

    /// Number of preview-only populate calls.
    #[must_use]
    pub fn populate_previews(&self) -> u64 {
        self.state.read().map(|s| s.populate_previews).unwrap_or_default()
    }

    /// Descriptions of every submitted edit, in submit order.
    #[must_use]
    pub fn submitted(&self) -> Vec<String> {
        self.state.read().map(|s| s.submitted.clone()).unwrap_or_default()
    }

    /// Whether a directory exists.
    #[must_use]
    pub fn has_directory(&self, path: &str) -> bool {
        self.state
            .read()
            .map(|s| s.directories.contains(path))
            .unwrap_or_default()
    }

    /// Whether a branch spec exists.
    #[must_use]
    pub fn has_branch_spec(&self, name: &str) -> bool {
        self.state
            .read()
            .map(|s| s.branch_specs.contains_key(name))
            .unwrap_or_default()
    }

    /// Returns a client spec by name.
    #[must_use]
    pub fn client(&self, name: &str) -> Option<ClientForm> {
        self.state
            .read()
            .ok()
            .and_then(|s| s.clients.get(name).cloned())
    }

    /// Returns the head contents of a file.
    #[must_use]
    pub fn file_head(&self, path: &str) -> Option<String> {
        self.state.read().ok().and_then(|s| {
            s.files
                .get(path)
                .and_then(|revs| revs.last())
                .map(|(_, contents)| contents.clone())
        })
    }
}

fn contents_at(state: &DepotState, path: &str, pin: Option<u64>) -> Option<String> {
    let revisions = state.files.get(path)?;
    revisions
        .iter()
        .filter(|(rev, _)| pin.is_none_or(|limit| *rev <= limit))
        .next_back()
        .map(|(_, contents)| contents.clone())
}

fn split_pin(filespec: &str) -> BackendResult<(&str, Option<u64>)> {
    match filespec.rsplit_once('@') {
        None => Ok((filespec, None)),
        Some((path, pin)) => {
            let revision = pin
                .parse()
                .map_err(|_| BackendError::Protocol(format!("bad revision pin: {filespec}")))?;
            Ok((path, Some(revision)))
        }
    }
}

#[async_trait]
impl DepotBackend for InMemoryDepot {
    async fn list_directories(&self, path: &str) -> BackendResult<Vec<DirEntry>> {
        let state = self.state.read().map_err(poisoned)?;
        if path == "." {
            return Ok(state
                .cwd
                .iter()
                .map(|cwd| DirEntry { path: cwd.clone() })
                .collect());
        }
        Ok(state
            .directories
            .iter()
            .filter(|dir| dir.as_str() == path)
            .map(|dir| DirEntry { path: dir.clone() })
            .collect())
    }

    async fn list_changes(&self, path: &str, limit: Option<usize>) -> BackendResult<Vec<Change>> {
        let state = self.state.read().map_err(poisoned)?;
        let prefix = strip_subtree(path);
        let mut revisions: Vec<u64> = state
            .changes
            .iter()
            .filter(|(_, paths)| touches(paths, prefix))
            .map(|(revision, _)| *revision)
            .collect();
        revisions.sort_unstable();
        revisions.reverse();
        if let Some(limit) = limit {
            revisions.truncate(limit);
        }
        Ok(revisions
            .into_iter()
            .map(|revision| Change {
                revision: Changelevel::new(revision),
            })
            .collect())
    }

    async fn list_branch_specs(&self, exact: &str) -> BackendResult<Vec<String>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .branch_specs
            .keys()
            .filter(|name| name.as_str() == exact)
            .cloned()
            .collect())
    }

    async fn create_branch_spec(&self, form: &BranchSpecForm) -> BackendResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.branch_specs.insert(form.name.clone(), form.clone());
        state.branch_spec_creates += 1;
        Ok(())
    }

    async fn list_clients(&self, exact: &str) -> BackendResult<Vec<String>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .clients
            .keys()
            .filter(|name| name.as_str() == exact)
            .cloned()
            .collect())
    }

    async fn create_client(&self, form: &ClientForm) -> BackendResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.clients.insert(form.name.clone(), form.clone());
        Ok(())
    }

    async fn file_contents(&self, filespec: &str) -> BackendResult<String> {
        let state = self.state.read().map_err(poisoned)?;
        let (path, pin) = split_pin(filespec)?;
        contents_at(&state, path, pin)
            .ok_or_else(|| BackendError::Backend(format!("{filespec} - no such file(s).")))
    }

    async fn populate(&self, request: &PopulateRequest) -> BackendResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if request.preview {
            state.populate_previews += 1;
            return Ok(());
        }

        let spec = state
            .branch_specs
            .get(&request.branch)
            .cloned()
            .ok_or_else(|| BackendError::Backend(format!("no such branch: {}", request.branch)))?;
        let source_root = strip_subtree(&spec.view.source).to_owned();
        let target_root = strip_subtree(&spec.view.target).to_owned();
        let (_, pin) = split_pin(&request.source)?;

        let copies: Vec<(String, String)> = state
            .files
            .keys()
            .filter_map(|path| {
                let suffix = path.strip_prefix(&source_root)?;
                suffix.starts_with('/').then(|| (path.clone(), suffix.to_owned()))
            })
            .collect();
        let revision = state.next_change;
        for (source_path, suffix) in copies {
            if let Some(contents) = contents_at(&state, &source_path, pin) {
                state
                    .files
                    .entry(format!("{target_root}{suffix}"))
                    .or_default()
                    .push((revision, contents));
            }
        }
        state.directories.insert(target_root.clone());
        state.changes.push((revision, vec![target_root]));
        state.next_change += 1;
        state.populate_calls += 1;
        Ok(())
    }

    async fn open_edit_session(&self, artifact: &str) -> BackendResult<Box<dyn EditSession>> {
        Ok(Box::new(MemoryEditSession {
            state: Arc::clone(&self.state),
            path: artifact.to_owned(),
            working: None,
            opened: false,
        }))
    }
}

/// One-file edit session over the in-memory depot.
struct MemoryEditSession {
    state: Arc<RwLock<DepotState>>,
    path: String,
    working: Option<String>,
    opened: bool,
}

impl MemoryEditSession {
    fn working(&self) -> BackendResult<&String> {
        self.working
            .as_ref()
            .ok_or_else(|| BackendError::Protocol(format!("{} - file(s) not synced", self.path)))
    }
}

#[async_trait]
impl EditSession for MemoryEditSession {
    async fn sync(&mut self) -> BackendResult<()> {
        let state = self.state.read().map_err(poisoned)?;
        let head = contents_at(&state, &self.path, None)
            .ok_or_else(|| BackendError::Backend(format!("{} - no such file(s).", self.path)))?;
        self.working = Some(head);
        Ok(())
    }

    async fn open_for_edit(&mut self) -> BackendResult<()> {
        let _ = self.working()?;
        self.opened = true;
        Ok(())
    }

    async fn read_file(&mut self) -> BackendResult<String> {
        self.working().cloned()
    }

    async fn write_file(&mut self, contents: &str) -> BackendResult<()> {
        let _ = self.working()?;
        self.working = Some(contents.to_owned());
        Ok(())
    }

    async fn diff(&mut self) -> BackendResult<String> {
        let state = self.state.read().map_err(poisoned)?;
        let head = contents_at(&state, &self.path, None).unwrap_or_default();
        let working = self.working()?;
        let mut lines = vec![format!("==== {} ====", self.path)];
        for line in head.lines() {
            if !working.lines().any(|new| new == line) {
                lines.push(format!("- {line}"));
            }
        }
        for line in working.lines() {
            if !head.lines().any(|old| old == line) {
                lines.push(format!("+ {line}"));
            }
        }
        Ok(lines.join("\n"))
    }

    async fn submit(&mut self, description: &str) -> BackendResult<()> {
        if !self.opened {
            return Err(BackendError::Protocol(format!(
                "{} - file(s) not opened for edit",
                self.path
            )));
        }
        let contents = self.working()?.clone();
        let mut state = self.state.write().map_err(poisoned)?;
        let revision = state.next_change;
        state
            .files
            .entry(self.path.clone())
            .or_default()
            .push((revision, contents));
        state.changes.push((revision, vec![self.path.clone()]));
        state.next_change += 1;
        state.submitted.push(description.to_owned());
        self.opened = false;
        Ok(())
    }

    async fn close(self: Box<Self>) -> BackendResult<()> {
        Ok(())
    }
}
