//! Application configuration model.
//!
//! Mirrors `config.toml`. Every section has defaults so a missing or partial
//! file still yields a usable configuration.

use crate::prompt::{DEFAULT_CONTENT_INTENT, DEFAULT_STYLE_INTENT};
use crate::session::SourceKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Base URL of a local Ollama server.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Model used when no provider profile is active.
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:3b";

/// Base URL of the generation service.
pub const DEFAULT_GENERATION_URL: &str = "http://localhost:8000";

/// Name of the spreadsheet that collects saved articles.
pub const DEFAULT_SPREADSHEET_NAME: &str = "YouTube SEO Results";

/// The API dialect spoken by a model provider.
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
#[strum(serialize_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions (OpenAI, Groq, DeepSeek...).
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    OpenAi,
    /// A local or remote Ollama server.
    #[default]
    Ollama,
}

/// A model provider profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Display name, e.g. "Groq Cloud" or "Local Ollama".
    pub name: String,
    pub provider: ProviderKind,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model_name: String,
    /// At most one profile is active at a time.
    #[serde(default)]
    pub is_active: bool,
}

impl ModelConfig {
    /// The profile used when nothing is active: local Ollama.
    pub fn local_fallback() -> Self {
        Self {
            name: "Local Ollama".to_string(),
            provider: ProviderKind::Ollama,
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            api_key: None,
            model_name: DEFAULT_OLLAMA_MODEL.to_string(),
            is_active: false,
        }
    }

    /// Short label such as `ollama/qwen2.5:3b`.
    pub fn label(&self) -> String {
        format!("{}/{}", self.provider, self.model_name)
    }
}

/// Read-only access to the active model provider.
pub trait ModelConfigProvider: Send + Sync {
    /// Returns the active profile, or the local fallback when none is active.
    fn get_active_model_config(&self) -> ModelConfig;
}

/// `[generation]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub base_url: String,
    pub source_kind: SourceKind,
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GENERATION_URL.to_string(),
            source_kind: SourceKind::Youtube,
            timeout_secs: 1200,
        }
    }
}

/// `[drive]` section. Unset paths resolve to the config directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveSettings {
    pub credentials_path: Option<PathBuf>,
    pub token_path: Option<PathBuf>,
    /// Drive folder that receives uploaded articles; root when unset.
    pub folder_id: Option<String>,
}

/// `[sheet]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetSettings {
    /// Spreadsheet to append to. Looked up (or created) by name when unset.
    pub spreadsheet_id: Option<String>,
    pub spreadsheet_name: String,
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            spreadsheet_name: DEFAULT_SPREADSHEET_NAME.to_string(),
        }
    }
}

/// `[workspace]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceSettings {
    /// Skip the configure step when a draft prompt already exists.
    pub direct_mode: bool,
    pub default_content_intent: String,
    pub default_style_intent: String,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            direct_mode: false,
            default_content_intent: DEFAULT_CONTENT_INTENT.to_string(),
            default_style_intent: DEFAULT_STYLE_INTENT.to_string(),
        }
    }
}

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generation: GenerationSettings,
    pub drive: DriveSettings,
    pub sheet: SheetSettings,
    pub workspace: WorkspaceSettings,
    pub models: Vec<ModelConfig>,
}

impl AppConfig {
    /// The first active model profile, if any.
    pub fn active_model(&self) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.is_active)
    }
}

impl ModelConfigProvider for AppConfig {
    fn get_active_model_config(&self) -> ModelConfig {
        self.active_model()
            .cloned()
            .unwrap_or_else(ModelConfig::local_fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.generation.base_url, DEFAULT_GENERATION_URL);
        assert_eq!(config.sheet.spreadsheet_name, DEFAULT_SPREADSHEET_NAME);
    }

    #[test]
    fn test_active_model_is_selected() {
        let config: AppConfig = toml::from_str(
            r#"
            [[models]]
            name = "Local"
            provider = "ollama"
            base_url = "http://localhost:11434"
            model_name = "llama3"

            [[models]]
            name = "Groq Cloud"
            provider = "openai"
            base_url = "https://api.groq.com/openai/v1"
            api_key = "gsk_test"
            model_name = "llama3-70b-8192"
            is_active = true
            "#,
        )
        .unwrap();

        let active = config.get_active_model_config();
        assert_eq!(active.name, "Groq Cloud");
        assert_eq!(active.provider, ProviderKind::OpenAi);
        assert_eq!(active.label(), "openai/llama3-70b-8192");
    }

    #[test]
    fn test_no_active_model_falls_back_to_local_ollama() {
        let config = AppConfig::default();
        let active = config.get_active_model_config();
        assert_eq!(active.provider, ProviderKind::Ollama);
        assert_eq!(active.base_url, DEFAULT_OLLAMA_URL);
        assert_eq!(active.model_name, DEFAULT_OLLAMA_MODEL);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [workspace]
            direct_mode = true
            "#,
        )
        .unwrap();
        assert!(config.workspace.direct_mode);
        assert_eq!(config.workspace.default_content_intent, DEFAULT_CONTENT_INTENT);
    }
}
