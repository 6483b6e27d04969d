//! Session domain module.
//!
//! This module contains the session entity, the prompt draft it carries, and
//! the repository interface used to persist it.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`, `DraftPrompt`, `SourceKind`)
//! - `repository`: Repository trait for session persistence

mod model;
mod repository;

pub use model::{DEFAULT_SESSION_TITLE, DraftPrompt, PROMPT_HISTORY_LIMIT, Session, SourceKind};
pub use repository::SessionRepository;
