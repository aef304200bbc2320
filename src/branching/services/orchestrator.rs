//! Branch orchestrator: four sequential, independently idempotent stages.
//!
//! Each stage re-derives the observable current state from the backend
//! before acting, so any stage failure can be fixed and the whole run
//! safely re-invoked. There is no compensating rollback.

use crate::branching::domain::{
    BranchRequest, Changelevel, Child, TemplateError, task_entry, version_entry,
};
use crate::branching::ports::{
    BackendError, BranchSpecForm, ClientForm, DepotBackend, PopulateRequest, Reporter, ViewMapping,
};
use crate::branching::services::registrar::{
    Insertion, RegisterAction, RegisterSpec, RegistrarError, RegistrationEngine,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while executing orchestration stages.
#[derive(Debug, Error)]
pub enum OrchestrateError {
    /// A backend operation failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// An index-entry template failed to render.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A registration failed.
    #[error(transparent)]
    Registrar(#[from] RegistrarError),
}

/// What one stage observed or did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAction {
    /// Backend state showed the work was already done.
    AlreadyDone,
    /// The side effect was applied.
    Performed,
    /// The side effect was previewed without committing.
    Previewed,
    /// The stage was skipped entirely.
    Skipped,
}

/// Outcome of one registration-engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReport {
    /// Depot path of the artifact.
    pub artifact: String,
    /// What the engine did.
    pub action: RegisterAction,
}

/// Result of a full orchestration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchOutcome {
    /// Branch-spec stage result.
    pub branch_spec: StageAction,
    /// Population stage result.
    pub population: StageAction,
    /// Base revision of the child branch, or the request changelevel when
    /// the child has no revisions yet.
    pub base: Changelevel,
    /// Mirror-client stage result (public version branches only).
    pub mirror_client: Option<StageAction>,
    /// Registration-engine calls, in execution order.
    pub registrations: Vec<RegistrationReport>,
}

/// Executes the branch-creation state machine over a frozen request.
#[derive(Clone)]
pub struct BranchOrchestrator<B>
where
    B: DepotBackend,
{
    backend: Arc<B>,
    reporter: Arc<dyn Reporter>,
}

impl<B> BranchOrchestrator<B>
where
    B: DepotBackend,
{
    /// Creates a new orchestrator.
    #[must_use]
    pub const fn new(backend: Arc<B>, reporter: Arc<dyn Reporter>) -> Self {
        Self { backend, reporter }
    }

    /// Runs the four stages in fixed order.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrateError`] on the first stage failure; remaining
    /// stages are aborted. Re-running after fixing the cause resumes from
    /// the first unfinished stage.
    pub async fn run(&self, request: &BranchRequest) -> Result<BranchOutcome, OrchestrateError> {
        let branch_spec = self.branch_spec_stage(request).await?;
        let have_branch = !matches!(branch_spec, StageAction::Skipped);
        let population = self.population_stage(request, have_branch).await?;
        let (base, effective_commit) = self.base_revision_stage(request).await?;

        let mut outcome = BranchOutcome {
            branch_spec,
            population,
            base,
            mirror_client: None,
            registrations: Vec::new(),
        };
        self.registration_stage(request, base, effective_commit, &mut outcome)
            .await?;
        Ok(outcome)
    }

    /// Stage 1: create the branch spec unless it already exists.
    async fn branch_spec_stage(
        &self,
        request: &BranchRequest,
    ) -> Result<StageAction, OrchestrateError> {
        let branch = request.branch_name();
        let view = ViewMapping {
            source: format!("{}/...", request.parent_path()),
            target: format!("{}/...", request.child_path()),
        };
        self.reporter
            .note(&format!("view={} {}", view.source, view.target));

        if !self.backend.list_branch_specs(&branch).await?.is_empty() {
            self.reporter
                .note(&format!("Branch spec {branch} already exists: skipping."));
            return Ok(StageAction::AlreadyDone);
        }
        if !request.commit() {
            self.reporter
                .note("--yes omitted: skipping branch creation.");
            return Ok(StageAction::Skipped);
        }

        self.reporter.note(&format!("Creating branch spec {branch}."));
        self.backend
            .create_branch_spec(&BranchSpecForm {
                name: branch,
                description: request.description().to_owned(),
                view,
            })
            .await?;
        Ok(StageAction::Performed)
    }

    /// Stage 2: populate the child from the parent at the pinned
    /// changelevel unless the child path already exists.
    ///
    /// The preview runs whenever the branch spec exists, even without
    /// `commit`, so the operator can inspect the prospective changes; only
    /// when the spec is also missing is the stage skipped outright.
    async fn population_stage(
        &self,
        request: &BranchRequest,
        have_branch: bool,
    ) -> Result<StageAction, OrchestrateError> {
        if !self
            .backend
            .list_directories(&request.child_path())
            .await?
            .is_empty()
        {
            self.reporter
                .note("Child branch already populated: skipping.");
            return Ok(StageAction::AlreadyDone);
        }

        let branch = request.branch_name();
        let populate = PopulateRequest {
            preview: !request.commit(),
            branch: branch.clone(),
            description: request.branching_sentence(),
            source: request.populate_source(),
        };
        if request.commit() {
            self.reporter.note(&format!("Populating branch {branch}..."));
            self.backend.populate(&populate).await?;
            Ok(StageAction::Performed)
        } else if have_branch {
            self.reporter.note("--yes omitted: previewing populate.");
            self.backend.populate(&populate).await?;
            Ok(StageAction::Previewed)
        } else {
            self.reporter.note("--yes omitted: skipping populate.");
            Ok(StageAction::Skipped)
        }
    }

    /// Stage 3: find the oldest change on the child branch.
    ///
    /// An un-populated branch cannot be meaningfully registered, so an empty
    /// history forces preview mode for the remaining stage.
    async fn base_revision_stage(
        &self,
        request: &BranchRequest,
    ) -> Result<(Changelevel, bool), OrchestrateError> {
        let subtree = format!("{}/...", request.child_path());
        let changes = self.backend.list_changes(&subtree, None).await?;
        match changes.last() {
            Some(oldest) => {
                self.reporter.note(&format!("base={}", oldest.revision));
                Ok((oldest.revision, request.commit()))
            }
            None => {
                self.reporter.note(&format!(
                    "Branch {} not populated: using base={}",
                    request.child(),
                    request.changelevel()
                ));
                Ok((request.changelevel(), false))
            }
        }
    }

    /// Stage 4: register the branch in the tracked artifacts relevant to
    /// its kind.
    async fn registration_stage(
        &self,
        request: &BranchRequest,
        base: Changelevel,
        commit: bool,
        outcome: &mut BranchOutcome,
    ) -> Result<(), OrchestrateError> {
        let engine = RegistrationEngine::new(Arc::clone(&self.backend), Arc::clone(&self.reporter));
        let layout = request.layout();
        let child = request.child().to_string();

        match request.child() {
            Child::Task { .. } => {
                let artifact = layout.document_path(request.project(), &layout.branch_index);
                let report = self
                    .register_index(&engine, request, &artifact, task_entry(request, base)?, commit)
                    .await?;
                outcome.registrations.push(report);
            }
            Child::Version { customer, .. } => {
                let artifact = layout.document_path(request.project(), &layout.version_index);
                let report = self
                    .register_index(
                        &engine,
                        request,
                        &artifact,
                        version_entry(request, base)?,
                        commit,
                    )
                    .await?;
                outcome.registrations.push(report);

                if customer.is_none() {
                    outcome.mirror_client = Some(self.mirror_client_stage(request, commit).await?);
                    let push = engine
                        .register(&RegisterSpec {
                            artifact: layout.pushes_path(),
                            marker: child.clone(),
                            insertion: Insertion::AppendAtEnd,
                            text: self.push_line(request),
                            description: format!("Registering {child}."),
                            commit,
                        })
                        .await?;
                    outcome.registrations.push(RegistrationReport {
                        artifact: layout.pushes_path(),
                        action: push,
                    });
                }
            }
        }
        Ok(())
    }

    async fn register_index(
        &self,
        engine: &RegistrationEngine<B>,
        request: &BranchRequest,
        artifact: &str,
        entry: String,
        commit: bool,
    ) -> Result<RegistrationReport, OrchestrateError> {
        let child = request.child().to_string();
        let action = engine
            .register(&RegisterSpec {
                artifact: artifact.to_owned(),
                marker: child.clone(),
                insertion: Insertion::BeforeMarker("</table>\n".to_owned()),
                text: entry,
                description: format!("Registering {child}."),
                commit,
            })
            .await?;
        Ok(RegistrationReport {
            artifact: artifact.to_owned(),
            action,
        })
    }

    /// Creates the mirror/export client for a public version branch unless
    /// one with the derived name already exists.
    async fn mirror_client_stage(
        &self,
        request: &BranchRequest,
        commit: bool,
    ) -> Result<StageAction, OrchestrateError> {
        let Some(version) = request.version() else {
            return Ok(StageAction::Skipped);
        };
        let project = request.project();
        let client = format!("git-fusion-{project}-version-{version}");

        if !self.backend.list_clients(&client).await?.is_empty() {
            self.reporter
                .note(&format!("client {client} already exists: skipping."));
            return Ok(StageAction::AlreadyDone);
        }
        if !commit {
            self.reporter
                .note(&format!("--yes omitted: skipping {client}"));
            return Ok(StageAction::Skipped);
        }

        self.reporter
            .note(&format!("Creating client spec {client}"));
        self.backend
            .create_client(&ClientForm {
                name: client.clone(),
                description: format!(
                    "Git-fusion client for syncing {project} version {version}"
                ),
                root: format!(
                    "{}/{project}-version-{version}/p4",
                    request.layout().mirror_root
                ),
                view: ViewMapping {
                    source: format!("{}/...", request.child_path()),
                    target: format!("//{client}/..."),
                },
            })
            .await?;
        Ok(StageAction::Performed)
    }

    fn push_line(&self, request: &BranchRequest) -> String {
        let version = request
            .version()
            .map(ToString::to_string)
            .unwrap_or_default();
        format!(
            "\n{}-version-{version}\t{}\t{}\n",
            request.project(),
            request.layout().push_remote,
            request.child()
        )
    }
}
