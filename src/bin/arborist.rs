//! Create a version or task branch in the depot.
//!
//! Usage:
//!
//! ```text
//! arborist [-P PROJECT] [-p PARENT] [-C CHANGELEVEL] [-d DESCRIPTION] [-y]
//!          (-c CHILD | -v | -t TASK)
//! ```
//!
//! Without `-y` the run is a preview: every stage reports what it would do,
//! the populate is executed in preview-only mode when the branch spec
//! exists, and no artifact edit is submitted. Re-running after a partial
//! failure is safe; every stage re-derives "already done" from depot state.

use clap::Parser;
use mockable::DefaultClock;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;
use tracing_subscriber::EnvFilter;

use arborist::branching::adapters::P4Depot;
use arborist::branching::domain::{BranchDirective, BranchTarget, Changelevel, DepotLayout};
use arborist::branching::ports::Reporter;
use arborist::branching::services::{
    BranchOrchestrator, ContextResolver, OrchestrateError, ResolveError,
};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "arborist", about = "Create a version or task branch in the depot.")]
struct Cli {
    /// Name of the project.
    #[arg(short = 'P', long)]
    project: Option<String>,

    /// Name of the parent branch.
    #[arg(short = 'p', long)]
    parent: Option<String>,

    /// Changelevel at which to make the branch.
    #[arg(short = 'C', long)]
    changelevel: Option<u64>,

    /// Description of the branch (for the branch spec).
    #[arg(short = 'd', long)]
    description: Option<String>,

    /// Yes, really make the branch.
    #[arg(short = 'y', long)]
    yes: bool,

    #[command(flatten)]
    target: TargetArgs,
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct TargetArgs {
    /// Name of the child branch.
    #[arg(short = 'c', long)]
    child: Option<String>,

    /// Make the next version branch.
    #[arg(short = 'v', long)]
    version: bool,

    /// Name of the task branch.
    #[arg(short = 't', long)]
    task: Option<String>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("exactly one of --child, --version, or --task is required")]
    MissingTarget,
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Orchestrate(#[from] OrchestrateError),
}

fn target(args: TargetArgs) -> Result<BranchTarget, CliError> {
    match args {
        TargetArgs {
            child: Some(child), ..
        } => Ok(BranchTarget::Explicit(child)),
        TargetArgs { task: Some(task), .. } => Ok(BranchTarget::Task(task)),
        TargetArgs { version: true, .. } => Ok(BranchTarget::NextVersion),
        TargetArgs { .. } => Err(CliError::MissingTarget),
    }
}

/// Reporter printing progress to standard output.
struct StdoutReporter;

impl Reporter for StdoutReporter {
    #[expect(
        clippy::print_stdout,
        reason = "operator progress lines are the user interface of this tool"
    )]
    fn note(&self, line: &str) {
        println!("{line}");
    }
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();
    let runtime = Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(run(cli)).map_err(Into::into)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let directive = BranchDirective {
        project: cli.project,
        parent: cli.parent,
        changelevel: cli.changelevel.map(Changelevel::new),
        description: cli.description,
        target: target(cli.target)?,
        commit: cli.yes,
    };

    let backend = Arc::new(P4Depot::new());
    let reporter: Arc<dyn Reporter> = Arc::new(StdoutReporter);
    let resolver = ContextResolver::new(
        Arc::clone(&backend),
        Arc::new(DefaultClock),
        Arc::clone(&reporter),
        DepotLayout::default(),
    );
    let request = resolver.resolve(&directive).await?;

    let orchestrator = BranchOrchestrator::new(backend, reporter);
    orchestrator.run(&request).await?;
    Ok(())
}
