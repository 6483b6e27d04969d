//! Application layer for vidwiki.
//!
//! Use cases that drive one session from source link to saved article:
//! the workspace workflow, the generation and persistence coordinators,
//! and the dashboard operations on the session collection.

pub mod app_services;
pub mod generation_orchestrator;
pub mod persistence_coordinator;
pub mod session;
pub mod workspace_usecase;

#[cfg(test)]
mod testing;

pub use app_services::AppServices;
pub use generation_orchestrator::GenerationOrchestrator;
pub use persistence_coordinator::{PersistenceCoordinator, SaveReport, SaveRequest};
pub use session::{SessionLifecycleManager, SessionUpdater};
pub use workspace_usecase::{
    GenerationOutcome, IntakeOutcome, SaveOutcome, SessionContext, WorkspaceUseCase,
};
