//! Configuration service implementation.
//!
//! Loads `config.toml` from the vidwiki configuration directory on first
//! access and caches it for the rest of the process.

use crate::storage::AtomicTomlFile;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use vidwiki_core::Result;
use vidwiki_core::config::{AppConfig, ModelConfig, ModelConfigProvider};

/// Environment variable that overrides `[generation] base_url`.
pub const GENERATION_URL_ENV: &str = "VIDWIKI_GENERATION_URL";

/// Configuration service that loads and caches the application configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    config_file: PathBuf,
    /// Cached configuration; `None` until first access.
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Creates a service reading `config_file`. Nothing is read until the
    /// configuration is first requested.
    pub fn new(config_file: impl Into<PathBuf>) -> Self {
        Self {
            config_file: config_file.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the configuration, falling back to defaults when the file
    /// cannot be read.
    pub fn get_config(&self) -> AppConfig {
        match self.try_get_config() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("[ConfigService] using default configuration: {}", e);
                let fallback = apply_env_overrides(
                    AppConfig::default(),
                    std::env::var(GENERATION_URL_ENV).ok(),
                );
                self.store(fallback.clone());
                fallback
            }
        }
    }

    /// Returns the configuration, surfacing read and parse errors.
    pub fn try_get_config(&self) -> Result<AppConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;
        self.store(loaded.clone());
        Ok(loaded)
    }

    fn store(&self, config: AppConfig) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(config);
    }

    fn load_config(&self) -> Result<AppConfig> {
        let file = AtomicTomlFile::<AppConfig>::new(&self.config_file);
        let config = match file.load()? {
            Some(config) => {
                tracing::debug!("[ConfigService] loaded {}", self.config_file.display());
                config
            }
            None => {
                tracing::debug!(
                    "[ConfigService] {} not found, using defaults",
                    self.config_file.display()
                );
                AppConfig::default()
            }
        };
        Ok(apply_env_overrides(
            config,
            std::env::var(GENERATION_URL_ENV).ok(),
        ))
    }
}

fn apply_env_overrides(mut config: AppConfig, generation_url: Option<String>) -> AppConfig {
    if let Some(url) = generation_url.filter(|u| !u.trim().is_empty()) {
        config.generation.base_url = url.trim().to_string();
    }
    config
}

impl ModelConfigProvider for ConfigService {
    fn get_active_model_config(&self) -> ModelConfig {
        self.get_config().get_active_model_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use vidwiki_core::config::DEFAULT_GENERATION_URL;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));
        let config = service.try_get_config().unwrap();
        assert_eq!(config.sheet, AppConfig::default().sheet);
        assert_eq!(config.workspace, AppConfig::default().workspace);
    }

    #[test]
    fn test_config_is_read_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[workspace]\ndirect_mode = true\n").unwrap();

        let service = ConfigService::new(&path);
        assert!(service.get_config().workspace.direct_mode);

        fs::write(&path, "[workspace]\ndirect_mode = false\n").unwrap();
        assert!(service.get_config().workspace.direct_mode);
        assert!(!ConfigService::new(&path).get_config().workspace.direct_mode);
    }

    #[test]
    fn test_broken_file_is_an_error_but_get_config_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[workspace\n").unwrap();

        let service = ConfigService::new(&path);
        assert!(service.try_get_config().is_err());
        assert_eq!(service.get_config().models, Vec::new());
    }

    #[test]
    fn test_env_override_replaces_generation_url() {
        let config = apply_env_overrides(
            AppConfig::default(),
            Some(" http://gen.internal:9000 ".to_string()),
        );
        assert_eq!(config.generation.base_url, "http://gen.internal:9000");

        let config = apply_env_overrides(AppConfig::default(), Some(String::new()));
        assert_eq!(config.generation.base_url, DEFAULT_GENERATION_URL);
    }

    #[test]
    fn test_active_model_comes_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [[models]]
            name = "Groq Cloud"
            provider = "openai"
            base_url = "https://api.groq.com/openai/v1"
            model_name = "llama3-70b-8192"
            is_active = true
            "#,
        )
        .unwrap();

        let service = ConfigService::new(&path);
        assert_eq!(service.get_active_model_config().name, "Groq Cloud");
    }
}
