//! Persisted representations of domain entities.
//!
//! The domain `Session` never touches disk directly. These DTOs pin the file
//! layout and carry a schema version so older files keep loading.

use serde::{Deserialize, Serialize};
use vidwiki_core::session::{DraftPrompt, Session, SourceKind};

/// Schema version written into every session file.
pub const SESSION_SCHEMA_VERSION: &str = "1.0.0";

fn default_version() -> String {
    SESSION_SCHEMA_VERSION.to_string()
}

/// V1.0.0: draft prompt as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPromptV1 {
    #[serde(default)]
    pub content_intent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_intent: Option<String>,
}

/// V1.0.0: one session file.
///
/// Files written before versioning was introduced have no `version` key and
/// are read as V1.0.0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionV1 {
    #[serde(default = "default_version")]
    pub version: String,
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_reference: Option<String>,
    #[serde(default)]
    pub source_kind: SourceKind,
    #[serde(default)]
    pub canonical_document: String,
    #[serde(default)]
    pub prompt_history: Vec<String>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    // Tables must follow plain values in TOML output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_prompt: Option<DraftPromptV1>,
}

impl From<&Session> for SessionV1 {
    fn from(session: &Session) -> Self {
        Self {
            version: default_version(),
            id: session.id.clone(),
            title: session.title.clone(),
            source_reference: session.source_reference.clone(),
            source_kind: session.source_kind,
            canonical_document: session.canonical_document.clone(),
            prompt_history: session.prompt_history.clone(),
            created_at: session.created_at.clone(),
            updated_at: session.updated_at.clone(),
            draft_prompt: session.draft_prompt.as_ref().map(|d| DraftPromptV1 {
                content_intent: d.content_intent.clone(),
                style_intent: d.style_intent.clone(),
            }),
        }
    }
}

impl SessionV1 {
    /// Converts the stored form into the domain model.
    pub fn into_domain(self) -> Session {
        if self.version != SESSION_SCHEMA_VERSION {
            tracing::warn!(
                "[SessionDto] session {} has schema version {}, reading as {}",
                self.id,
                self.version,
                SESSION_SCHEMA_VERSION
            );
        }

        let updated_at = if self.updated_at.is_empty() {
            self.created_at.clone()
        } else {
            self.updated_at
        };

        Session {
            id: self.id,
            title: self.title,
            source_reference: self.source_reference,
            source_kind: self.source_kind,
            draft_prompt: self.draft_prompt.map(|d| DraftPrompt {
                content_intent: d.content_intent,
                style_intent: d.style_intent,
            }),
            canonical_document: self.canonical_document,
            prompt_history: self.prompt_history,
            created_at: self.created_at,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unversioned_file_reads_as_v1() {
        let dto: SessionV1 = toml::from_str(
            r#"
            id = "abc"
            title = "Old"
            created_at = "2024-01-01T00:00:00Z"
            "#,
        )
        .unwrap();

        assert_eq!(dto.version, SESSION_SCHEMA_VERSION);
        let session = dto.into_domain();
        assert_eq!(session.updated_at, "2024-01-01T00:00:00Z");
        assert_eq!(session.source_kind, SourceKind::Youtube);
        assert!(session.draft_prompt.is_none());
    }

    #[test]
    fn test_serialized_file_keeps_draft_and_history() {
        let mut session = Session::new("Recipe");
        session.source_reference = Some("https://youtu.be/abc".to_string());
        session.draft_prompt = Some(DraftPrompt::new("Cover the steps").with_style("Bullets"));
        session.canonical_document = "Body\n\n#food".to_string();
        session.record_prompt("composed");

        let text = toml::to_string_pretty(&SessionV1::from(&session)).unwrap();
        assert!(text.contains("version = \"1.0.0\""));

        let restored = toml::from_str::<SessionV1>(&text).unwrap().into_domain();
        assert_eq!(restored, session);
    }
}
