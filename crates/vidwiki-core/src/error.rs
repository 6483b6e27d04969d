//! Error types for vidwiki.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which half of a generation unit of work failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    /// Registering the source reference with the backend.
    RegisterSource,
    /// Requesting the generated text.
    Generate,
    /// Deriving a title from the source reference.
    DeriveTitle,
}

/// A shared error type for the entire vidwiki workspace.
///
/// Every error raised by an external collaborator is converted into one of
/// these variants at the boundary that issued the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VidwikiError {
    /// Missing or invalid source reference. Blocks the intake step.
    #[error("Invalid source reference: {0}")]
    Intake(String),

    /// The generation backend failed.
    #[error("Generation failed during {stage}: {message}")]
    Generation {
        stage: GenerationStage,
        message: String,
        retryable: bool,
    },

    /// A save target's preconditions are not met.
    #[error("{sink} is not configured: {reason}")]
    SinkNotReady { sink: String, reason: String },

    /// A save target's write failed after readiness passed.
    #[error("Writing to {sink} failed: {message}")]
    SinkWrite { sink: String, message: String },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Another generation or save is already outstanding for the session.
    #[error("Session '{0}' is busy")]
    Busy(String),

    /// A wizard trigger is not accepted in the current step.
    #[error("Cannot {trigger} from step {step}")]
    InvalidTransition { step: String, trigger: String },

    /// A confirmation token was unknown, already used, or bound to another action.
    #[error("Confirmation rejected: {0}")]
    Confirmation(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VidwikiError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an Intake error
    pub fn intake(message: impl Into<String>) -> Self {
        Self::Intake(message.into())
    }

    /// Creates a Generation error
    pub fn generation(stage: GenerationStage, message: impl Into<String>, retryable: bool) -> Self {
        Self::Generation {
            stage,
            message: message.into(),
            retryable,
        }
    }

    /// Creates a SinkNotReady error
    pub fn sink_not_ready(sink: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SinkNotReady {
            sink: sink.into(),
            reason: reason.into(),
        }
    }

    /// Creates a SinkWrite error
    pub fn sink_write(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a generation failure
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation { .. })
    }

    /// Check if this is an intake error
    pub fn is_intake(&self) -> bool {
        matches!(self, Self::Intake(_))
    }

    /// Check if retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Generation { retryable, .. } => *retryable,
            Self::SinkWrite { .. } | Self::Io { .. } => true,
            _ => false,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for VidwikiError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for VidwikiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for VidwikiError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for VidwikiError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (used by binaries and adapters)
impl From<anyhow::Error> for VidwikiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, VidwikiError>`.
pub type Result<T> = std::result::Result<T, VidwikiError>;
