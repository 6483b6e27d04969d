//! Session domain model.
//!
//! A session is the durable unit of work for one article produced from one
//! video source.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title used when neither the user nor the source supplies one.
pub const DEFAULT_SESSION_TITLE: &str = "New article";

/// Maximum number of composed prompts kept in a session's history.
pub const PROMPT_HISTORY_LIMIT: usize = 20;

/// The kind of source a session was created from.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SourceKind {
    /// A YouTube video link.
    #[default]
    Youtube,
    /// Any other URL the generation backend can ingest.
    Url,
}

/// Generation instructions, split into what to write and how to present it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPrompt {
    /// Content requirements (what the article must cover).
    pub content_intent: String,
    /// Presentation requirements (tone, layout, length).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_intent: Option<String>,
}

impl DraftPrompt {
    /// Creates a draft with only a content intent.
    pub fn new(content_intent: impl Into<String>) -> Self {
        Self {
            content_intent: content_intent.into(),
            style_intent: None,
        }
    }

    /// Sets the style intent. Blank input clears it.
    pub fn with_style(mut self, style_intent: impl Into<String>) -> Self {
        let style = style_intent.into();
        self.style_intent = if style.trim().is_empty() {
            None
        } else {
            Some(style)
        };
        self
    }

    /// Returns true when neither intent carries any text.
    pub fn is_empty(&self) -> bool {
        self.content_intent.trim().is_empty()
            && self
                .style_intent
                .as_deref()
                .is_none_or(|s| s.trim().is_empty())
    }
}

/// Represents an article session in the domain layer.
///
/// This is the "pure" domain model that business logic operates on,
/// independent of any specific storage format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format), immutable after creation
    pub id: String,
    /// Human-readable session title
    pub title: String,
    /// URL or identifier of the input video
    #[serde(default)]
    pub source_reference: Option<String>,
    /// Kind of the input source
    #[serde(default)]
    pub source_kind: SourceKind,
    /// The most recently used generation instructions
    #[serde(default)]
    pub draft_prompt: Option<DraftPrompt>,
    /// The last saved merged text (body + tags); empty if never saved
    #[serde(default)]
    pub canonical_document: String,
    /// Composed prompts persisted by saves, oldest first
    #[serde(default)]
    pub prompt_history: Vec<String>,
    /// Timestamp when the session was created (RFC 3339)
    pub created_at: String,
    /// Timestamp when the session was last updated (RFC 3339)
    pub updated_at: String,
}

impl Session {
    /// Creates a fresh session with a new identifier.
    ///
    /// A blank title is replaced by [`DEFAULT_SESSION_TITLE`].
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            DEFAULT_SESSION_TITLE.to_string()
        } else {
            title.trim().to_string()
        };
        let now = chrono::Utc::now().to_rfc3339();

        Self {
            id: Uuid::new_v4().to_string(),
            title,
            source_reference: None,
            source_kind: SourceKind::default(),
            draft_prompt: None,
            canonical_document: String::new(),
            prompt_history: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Returns true if the session has been saved at least once.
    pub fn has_saved_document(&self) -> bool {
        !self.canonical_document.trim().is_empty()
    }

    /// Returns the source reference if it is present and non-blank.
    pub fn source(&self) -> Option<&str> {
        self.source_reference
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    /// Appends a composed prompt to the history, dropping the oldest entries
    /// beyond [`PROMPT_HISTORY_LIMIT`]. Consecutive duplicates are collapsed.
    pub fn record_prompt(&mut self, composed_prompt: &str) {
        if self.prompt_history.last().map(String::as_str) == Some(composed_prompt) {
            return;
        }
        self.prompt_history.push(composed_prompt.to_string());
        if self.prompt_history.len() > PROMPT_HISTORY_LIMIT {
            let overflow = self.prompt_history.len() - PROMPT_HISTORY_LIMIT;
            self.prompt_history.drain(..overflow);
        }
    }

    /// Refreshes `updated_at` to the current time.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
