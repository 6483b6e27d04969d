//! Generation backend boundary.
//!
//! The backend turns a source reference plus a composed prompt into article
//! text. Transcript extraction happens on the backend side.

use crate::error::Result;
use crate::hashtag::{self, ExtractedText};
use crate::prompt;
use crate::session::{DraftPrompt, SourceKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Operations consumed from the external generation service.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Registers (or re-registers) the source of a session. Registering the
    /// same reference twice has no additional effect.
    async fn register_source(
        &self,
        session_id: &str,
        source_reference: &str,
        kind: SourceKind,
    ) -> Result<()>;

    /// Generates article text for a session whose source is registered.
    async fn generate(&self, session_id: &str, prompt: &str) -> Result<String>;

    /// Derives a human-readable title from a source reference.
    async fn derive_title(&self, source_reference: &str) -> Result<String>;
}

/// One generation attempt, rebuilt from the current draft for every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub session_id: String,
    pub source_reference: String,
    pub source_kind: SourceKind,
    pub composed_prompt: String,
}

impl GenerationRequest {
    /// Builds a request by composing the draft's sub-prompts.
    pub fn new(
        session_id: impl Into<String>,
        source_reference: impl Into<String>,
        source_kind: SourceKind,
        draft: &DraftPrompt,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            source_reference: source_reference.into(),
            source_kind,
            composed_prompt: prompt::compose_draft(draft),
        }
    }
}

/// A generated article, split into body and hashtags.
///
/// Body and tags are extracted together and edited independently
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    /// Article text with hashtags removed.
    pub body: String,
    /// Comma-joined hashtags.
    pub tags: String,
    /// Label of the model provider that was active at generation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl GeneratedArtifact {
    /// Splits raw generated text into an artifact, trimming the padding
    /// around it.
    pub fn from_raw(raw: &str) -> Self {
        let ExtractedText { body, tags } = hashtag::extract(raw.trim());
        Self {
            body: body.trim().to_string(),
            tags,
            provider: None,
        }
    }

    /// Rebuilds an artifact from a saved canonical document, recovering the
    /// saved body exactly.
    pub fn from_canonical(document: &str) -> Self {
        let ExtractedText { body, tags } = hashtag::extract(document);
        Self {
            body,
            tags,
            provider: None,
        }
    }

    /// Attaches the provider label.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// The canonical document for persistence.
    pub fn canonical_document(&self) -> String {
        hashtag::merge(&self.body, &self.tags)
    }
}
