//! Domain layer for vidwiki.
//!
//! Holds the session model, the workflow state machine, the prompt composer,
//! the hashtag engine, and the traits of every external collaborator.

pub mod config;
pub mod confirmation;
pub mod error;
pub mod generation;
pub mod hashtag;
pub mod prompt;
pub mod session;
pub mod sink;
pub mod wizard;

// Re-export common error type
pub use error::{Result, VidwikiError};
