//! TOML-based SessionRepository implementation

use crate::dto::SessionV1;
use crate::paths::VidwikiPaths;
use crate::storage::AtomicTomlFile;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use vidwiki_core::session::{Session, SessionRepository};
use vidwiki_core::{Result, VidwikiError};

/// Stores each session as an individual TOML file.
///
/// ```text
/// sessions_dir/
/// ├── 0b5e...-session-id-1.toml
/// └── 7f21...-session-id-2.toml
/// ```
///
/// Writes are atomic (tmp file + rename) and serialized by a per-file lock.
/// Two processes saving the same session concurrently end with whichever
/// write landed last.
pub struct TomlSessionRepository {
    sessions_dir: PathBuf,
}

impl TomlSessionRepository {
    /// Creates the repository, creating `sessions_dir` if needed.
    pub fn new(sessions_dir: impl AsRef<Path>) -> Result<Self> {
        let sessions_dir = sessions_dir.as_ref().to_path_buf();
        fs::create_dir_all(&sessions_dir).map_err(|e| {
            VidwikiError::io(format!(
                "Failed to create sessions directory {}: {}",
                sessions_dir.display(),
                e
            ))
        })?;
        Ok(Self { sessions_dir })
    }

    /// Creates the repository under the resolved configuration directory.
    pub fn default_location(paths: &VidwikiPaths) -> Result<Self> {
        Self::new(paths.sessions_dir())
    }

    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    fn session_file(&self, session_id: &str) -> Option<AtomicTomlFile<SessionV1>> {
        if !is_safe_id(session_id) {
            return None;
        }
        Some(AtomicTomlFile::new(
            self.sessions_dir.join(format!("{}.toml", session_id)),
        ))
    }
}

/// Session ids become file names, so they must not escape the directory.
fn is_safe_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[async_trait]
impl SessionRepository for TomlSessionRepository {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        let Some(file) = self.session_file(session_id) else {
            return Ok(None);
        };
        Ok(file.load()?.map(SessionV1::into_domain))
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let file = self.session_file(&session.id).ok_or_else(|| {
            VidwikiError::data_access(format!("invalid session id '{}'", session.id))
        })?;
        file.save(&SessionV1::from(session))?;
        tracing::debug!("[TomlSessionRepository] saved {}", file.path().display());
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        if let Some(file) = self.session_file(session_id) {
            if file.remove()? {
                tracing::debug!("[TomlSessionRepository] deleted {}", session_id);
            }
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Session>> {
        let mut sessions = Vec::new();

        for entry in fs::read_dir(&self.sessions_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                continue;
            }

            match AtomicTomlFile::<SessionV1>::new(&path).load() {
                Ok(Some(dto)) => sessions.push(dto.into_domain()),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("[TomlSessionRepository] skipping unreadable file: {}", e);
                }
            }
        }

        // Most recent first
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_session(title: &str, updated_at: &str) -> Session {
        let mut session = Session::new(title);
        session.created_at = "2024-01-01T00:00:00Z".to_string();
        session.updated_at = updated_at.to_string();
        session
    }

    #[tokio::test]
    async fn test_save_and_find_by_id() {
        let temp_dir = TempDir::new().unwrap();
        let repository = TomlSessionRepository::new(temp_dir.path()).unwrap();

        let mut session = create_test_session("Test", "2024-01-01T00:00:00Z");
        session.canonical_document = "Hello ,\n\n#World, #foo".to_string();
        repository.save(&session).await.unwrap();

        let loaded = repository.find_by_id(&session.id).await.unwrap();
        assert_eq!(loaded, Some(session));
    }

    #[tokio::test]
    async fn test_find_unknown_id_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let repository = TomlSessionRepository::new(temp_dir.path()).unwrap();

        assert!(repository.find_by_id("missing").await.unwrap().is_none());
        assert!(repository.find_by_id("../escape").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let repository = TomlSessionRepository::new(temp_dir.path()).unwrap();

        let old = create_test_session("old", "2024-01-01T00:00:00Z");
        let new = create_test_session("new", "2024-03-01T00:00:00Z");
        let mid = create_test_session("mid", "2024-02-01T00:00:00Z");
        for session in [&old, &new, &mid] {
            repository.save(session).await.unwrap();
        }
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();
        fs::write(temp_dir.path().join("broken.toml"), "id = ").unwrap();

        let titles: Vec<String> = repository
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let repository = TomlSessionRepository::new(temp_dir.path()).unwrap();

        let session = create_test_session("to delete", "2024-01-01T00:00:00Z");
        repository.save(&session).await.unwrap();
        assert!(repository.find_by_id(&session.id).await.unwrap().is_some());

        repository.delete(&session.id).await.unwrap();
        assert!(repository.find_by_id(&session.id).await.unwrap().is_none());

        // Deleting again is not an error
        repository.delete(&session.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_rejects_unsafe_id() {
        let temp_dir = TempDir::new().unwrap();
        let repository = TomlSessionRepository::new(temp_dir.path()).unwrap();

        let mut session = create_test_session("bad", "2024-01-01T00:00:00Z");
        session.id = "../../etc/passwd".to_string();
        assert!(matches!(
            repository.save(&session).await,
            Err(VidwikiError::DataAccess(_))
        ));
    }
}
