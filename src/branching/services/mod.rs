//! Application services for branch resolution and creation.

mod orchestrator;
mod registrar;
mod resolver;

pub use orchestrator::{
    BranchOrchestrator, BranchOutcome, OrchestrateError, RegistrationReport, StageAction,
};
pub use registrar::{
    Insertion, RegisterAction, RegisterSpec, RegistrarError, RegistrationEngine, apply_insertion,
};
pub use resolver::{ContextResolver, ResolveError};
