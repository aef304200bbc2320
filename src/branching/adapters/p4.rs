//! Depot backend adapter over the `p4` command-line client.
//!
//! Queries use tagged output (`-ztag`); branch and client specs are created
//! through form input (`-i`). Edit sessions build a fresh temporary client
//! mapping exactly one artifact into a scratch directory, and delete the
//! client again when the session closes.

use async_trait::async_trait;
use camino::Utf8PathBuf;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use uuid::Uuid;

use crate::branching::domain::Changelevel;
use crate::branching::ports::{
    BackendError, BackendResult, BranchSpecForm, Change, ClientForm, DepotBackend, DirEntry,
    EditSession, PopulateRequest,
};

/// Depot backend that shells out to the `p4` client.
///
/// Assumes a single, already-authenticated connection configured through the
/// usual `P4PORT`/`P4USER` environment.
#[derive(Debug, Clone)]
pub struct P4Depot {
    program: String,
}

impl Default for P4Depot {
    fn default() -> Self {
        Self::new()
    }
}

impl P4Depot {
    /// Creates an adapter invoking `p4` from the search path.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: "p4".to_owned(),
        }
    }

    /// Creates an adapter invoking the given program.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

async fn run_p4(program: &str, args: &[&str], input: Option<&str>) -> BackendResult<String> {
    tracing::debug!(?args, "running p4");
    let mut command = Command::new(program);
    command.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
    if input.is_some() {
        command.stdin(Stdio::piped());
    }
    let mut process = command
        .spawn()
        .map_err(|err| BackendError::Protocol(format!("failed to spawn {program}: {err}")))?;
    if let (Some(form), Some(stdin)) = (input, process.stdin.take().as_mut()) {
        stdin.write_all(form.as_bytes()).await?;
    }
    let output = process.wait_with_output().await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BackendError::Backend(stderr.trim().to_owned()));
    }
    String::from_utf8(output.stdout)
        .map_err(|_| BackendError::Protocol("p4 output is not valid UTF-8".to_owned()))
}

/// Parses `-ztag` output into field maps, one per record.
fn parse_tagged(output: &str) -> Vec<HashMap<String, String>> {
    let mut records = Vec::new();
    let mut current: HashMap<String, String> = HashMap::new();
    for line in output.lines() {
        if line.is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("... ") {
            let (key, value) = rest.split_once(' ').unwrap_or((rest, ""));
            current.insert(key.to_owned(), value.to_owned());
        }
    }
    if !current.is_empty() {
        records.push(current);
    }
    records
}

async fn run_tagged(
    program: &str,
    args: &[&str],
) -> BackendResult<Vec<HashMap<String, String>>> {
    let mut full = vec!["-ztag"];
    full.extend_from_slice(args);
    let output = run_p4(program, &full, None).await?;
    Ok(parse_tagged(&output))
}

fn field(records: Vec<HashMap<String, String>>, name: &str) -> Vec<String> {
    records
        .into_iter()
        .filter_map(|mut record| record.remove(name))
        .collect()
}

fn indent_lines(text: &str) -> String {
    text.lines()
        .map(|line| format!("\t{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl DepotBackend for P4Depot {
    async fn list_directories(&self, path: &str) -> BackendResult<Vec<DirEntry>> {
        let records = run_tagged(&self.program, &["dirs", path]).await?;
        Ok(field(records, "dir")
            .into_iter()
            .map(|dir| DirEntry { path: dir })
            .collect())
    }

    async fn list_changes(&self, path: &str, limit: Option<usize>) -> BackendResult<Vec<Change>> {
        let capped = limit.map(|n| n.to_string());
        let mut args = vec!["changes"];
        if let Some(n) = capped.as_deref() {
            args.push("-m");
            args.push(n);
        }
        args.push(path);
        let records = run_tagged(&self.program, &args).await?;
        let mut changes = Vec::new();
        for number in field(records, "change") {
            let revision = number.parse().map_err(|_| {
                BackendError::Protocol(format!("unparseable change number: {number}"))
            })?;
            changes.push(Change {
                revision: Changelevel::new(revision),
            });
        }
        Ok(changes)
    }

    async fn list_branch_specs(&self, exact: &str) -> BackendResult<Vec<String>> {
        let records = run_tagged(&self.program, &["branches", "-E", exact]).await?;
        Ok(field(records, "branch"))
    }

    async fn create_branch_spec(&self, form: &BranchSpecForm) -> BackendResult<()> {
        let text = format!(
            "Branch:\t{}\n\nDescription:\n{}\n\nView:\n\t{} {}\n",
            form.name,
            indent_lines(&form.description),
            form.view.source,
            form.view.target
        );
        run_p4(&self.program, &["branch", "-i"], Some(&text)).await?;
        Ok(())
    }

    async fn list_clients(&self, exact: &str) -> BackendResult<Vec<String>> {
        let records = run_tagged(&self.program, &["clients", "-E", exact]).await?;
        Ok(field(records, "client"))
    }

    async fn create_client(&self, form: &ClientForm) -> BackendResult<()> {
        let text = format!(
            "Client:\t{}\n\nDescription:\n{}\n\nRoot:\t{}\n\nView:\n\t{} {}\n",
            form.name,
            indent_lines(&form.description),
            form.root,
            form.view.source,
            form.view.target
        );
        run_p4(&self.program, &["client", "-i"], Some(&text)).await?;
        Ok(())
    }

    async fn file_contents(&self, filespec: &str) -> BackendResult<String> {
        run_p4(&self.program, &["print", "-q", filespec], None).await
    }

    async fn populate(&self, request: &PopulateRequest) -> BackendResult<()> {
        let mut args = vec!["populate"];
        if request.preview {
            args.push("-n");
        }
        args.extend_from_slice(&["-b", &request.branch]);
        args.extend_from_slice(&["-d", &request.description]);
        args.extend_from_slice(&["-s", &request.source]);
        run_p4(&self.program, &args, None).await?;
        Ok(())
    }

    async fn open_edit_session(&self, artifact: &str) -> BackendResult<Box<dyn EditSession>> {
        let scratch = tempfile::tempdir()?;
        let root = Utf8PathBuf::from_path_buf(scratch.path().to_path_buf())
            .map_err(|_| BackendError::Protocol("scratch dir path is not valid UTF-8".to_owned()))?;
        let client = format!("arborist-{}", Uuid::new_v4());
        let form = format!(
            "Client:\t{client}\n\nDescription:\n\tTemporary one-file workspace.\n\nRoot:\t{root}\n\nView:\n\t{artifact} //{client}/target\n"
        );
        run_p4(&self.program, &["client", "-i"], Some(&form)).await?;
        Ok(Box::new(P4EditSession {
            program: self.program.clone(),
            client,
            local: root.join("target"),
            _scratch: scratch,
        }))
    }
}

/// Edit session over a temporary one-file `p4` client.
struct P4EditSession {
    program: String,
    client: String,
    local: Utf8PathBuf,
    _scratch: tempfile::TempDir,
}

impl P4EditSession {
    fn filespec(&self) -> String {
        format!("//{}/target", self.client)
    }

    async fn run(&self, args: &[&str]) -> BackendResult<String> {
        let mut full = vec!["-c", self.client.as_str()];
        full.extend_from_slice(args);
        run_p4(&self.program, &full, None).await
    }
}

#[async_trait]
impl EditSession for P4EditSession {
    async fn sync(&mut self) -> BackendResult<()> {
        let filespec = self.filespec();
        self.run(&["sync", "-f", &filespec]).await?;
        Ok(())
    }

    async fn open_for_edit(&mut self) -> BackendResult<()> {
        let filespec = self.filespec();
        self.run(&["edit", &filespec]).await?;
        Ok(())
    }

    async fn read_file(&mut self) -> BackendResult<String> {
        Ok(tokio::fs::read_to_string(&self.local).await?)
    }

    async fn write_file(&mut self, contents: &str) -> BackendResult<()> {
        Ok(tokio::fs::write(&self.local, contents).await?)
    }

    async fn diff(&mut self) -> BackendResult<String> {
        let filespec = self.filespec();
        self.run(&["diff", &filespec]).await
    }

    async fn submit(&mut self, description: &str) -> BackendResult<()> {
        let filespec = self.filespec();
        self.run(&["submit", "-d", description, &filespec]).await?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> BackendResult<()> {
        // Pending edits would block client deletion; revert is a no-op after
        // a successful submit.
        let filespec = self.filespec();
        if let Err(err) = self.run(&["revert", "-k", &filespec]).await {
            tracing::debug!(%err, "revert before client teardown failed");
        }
        run_p4(&self.program, &["client", "-d", &self.client], None).await?;
        Ok(())
    }
}
