//! Unified path management for vidwiki files.
//!
//! Everything lives under one configuration directory so a single
//! environment variable can relocate the whole installation.

use std::path::{Path, PathBuf};
use vidwiki_core::VidwikiError;

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "VIDWIKI_CONFIG_DIR";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform configuration directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(
                f,
                "Cannot find configuration directory (set {} to choose one)",
                CONFIG_DIR_ENV
            ),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for VidwikiError {
    fn from(err: PathError) -> Self {
        VidwikiError::config(err.to_string())
    }
}

/// Unified path management for vidwiki.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/vidwiki/           # Config directory (or $VIDWIKI_CONFIG_DIR)
/// ├── config.toml              # Application configuration
/// ├── sessions/                # One TOML file per session
/// └── google/
///     ├── credentials.json     # OAuth client secrets
///     └── token.json           # Authorized user token
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VidwikiPaths {
    root: PathBuf,
}

impl VidwikiPaths {
    /// Resolves the configuration directory from the environment.
    pub fn resolve() -> Result<Self, PathError> {
        let env_override = std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from);
        Self::resolve_with(env_override, dirs::config_dir())
    }

    /// Resolves the directory from an explicit override and platform default.
    fn resolve_with(
        env_override: Option<PathBuf>,
        platform_config: Option<PathBuf>,
    ) -> Result<Self, PathError> {
        if let Some(dir) = env_override.filter(|p| !p.as_os_str().is_empty()) {
            return Ok(Self { root: dir });
        }
        platform_config
            .map(|dir| Self {
                root: dir.join("vidwiki"),
            })
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Uses `root` as the configuration directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn config_dir(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join("sessions")
    }

    pub fn google_dir(&self) -> PathBuf {
        self.root.join("google")
    }

    pub fn google_credentials_file(&self) -> PathBuf {
        self.google_dir().join("credentials.json")
    }

    pub fn google_token_file(&self) -> PathBuf {
        self.google_dir().join("token.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_over_platform_dir() {
        let paths = VidwikiPaths::resolve_with(
            Some(PathBuf::from("/tmp/vw")),
            Some(PathBuf::from("/home/u/.config")),
        )
        .unwrap();
        assert_eq!(paths.config_dir(), Path::new("/tmp/vw"));
    }

    #[test]
    fn test_platform_dir_gets_app_suffix() {
        let paths =
            VidwikiPaths::resolve_with(None, Some(PathBuf::from("/home/u/.config"))).unwrap();
        assert!(paths.config_dir().ends_with("vidwiki"));
        assert!(paths.config_file().ends_with("config.toml"));
        assert!(paths.sessions_dir().starts_with(paths.config_dir()));
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let paths = VidwikiPaths::resolve_with(
            Some(PathBuf::new()),
            Some(PathBuf::from("/home/u/.config")),
        )
        .unwrap();
        assert_eq!(paths.config_dir(), Path::new("/home/u/.config/vidwiki"));
    }

    #[test]
    fn test_missing_dirs_is_an_error() {
        assert!(matches!(
            VidwikiPaths::resolve_with(None, None),
            Err(PathError::ConfigDirNotFound)
        ));
    }

    #[test]
    fn test_google_files() {
        let paths = VidwikiPaths::with_root("/cfg");
        assert_eq!(
            paths.google_credentials_file(),
            PathBuf::from("/cfg/google/credentials.json")
        );
        assert_eq!(
            paths.google_token_file(),
            PathBuf::from("/cfg/google/token.json")
        );
    }
}
