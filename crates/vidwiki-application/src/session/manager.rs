use std::sync::Arc;
use vidwiki_core::generation::GenerationBackend;
use vidwiki_core::session::{DEFAULT_SESSION_TITLE, Session, SessionRepository, SourceKind};
use vidwiki_core::wizard::validate_source_reference;
use vidwiki_core::{Result, VidwikiError};

/// Creates, loads, lists and deletes sessions.
///
/// The manager owns the durable side of a session. Workflow state lives in
/// the workspace that has the session open.
pub struct SessionLifecycleManager {
    repository: Arc<dyn SessionRepository>,
    backend: Arc<dyn GenerationBackend>,
}

impl SessionLifecycleManager {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            repository,
            backend,
        }
    }

    /// Creates and stores an empty session. A blank title gets the default.
    pub async fn create(&self, title: &str) -> Result<Session> {
        let session = Session::new(title);
        self.repository.save(&session).await?;
        tracing::info!(
            "[SessionLifecycle] created session {} '{}'",
            session.id,
            session.title
        );
        Ok(session)
    }

    /// Creates a session for a pasted source link, titled after the source.
    ///
    /// Title derivation is best-effort: when the backend cannot provide one
    /// the session is still created with the default title.
    pub async fn create_from_source(
        &self,
        source_reference: &str,
        kind: SourceKind,
    ) -> Result<Session> {
        let source = validate_source_reference(source_reference)?;

        let title = match self.backend.derive_title(&source).await {
            Ok(title) => title,
            Err(e) => {
                tracing::warn!(
                    "[SessionLifecycle] could not derive title for {}: {}",
                    source,
                    e
                );
                DEFAULT_SESSION_TITLE.to_string()
            }
        };

        let mut session = Session::new(title);
        session.source_reference = Some(source);
        session.source_kind = kind;
        self.repository.save(&session).await?;
        tracing::info!(
            "[SessionLifecycle] created session {} '{}' from source",
            session.id,
            session.title
        );
        Ok(session)
    }

    pub async fn load(&self, session_id: &str) -> Result<Session> {
        self.repository
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| VidwikiError::not_found("Session", session_id))
    }

    /// All sessions, most recently updated first.
    pub async fn list(&self) -> Result<Vec<Session>> {
        let mut sessions = self.repository.list_all().await?;
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    /// Removes a session permanently.
    ///
    /// Callers are expected to have obtained confirmation first.
    pub async fn delete(&self, session_id: &str) -> Result<()> {
        if self.repository.find_by_id(session_id).await?.is_none() {
            return Err(VidwikiError::not_found("Session", session_id));
        }
        self.repository.delete(session_id).await?;
        tracing::info!("[SessionLifecycle] deleted session {}", session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemorySessionRepository, ScriptedBackend};

    fn manager(backend: ScriptedBackend) -> (SessionLifecycleManager, Arc<InMemorySessionRepository>) {
        let repository = Arc::new(InMemorySessionRepository::default());
        (
            SessionLifecycleManager::new(repository.clone(), Arc::new(backend)),
            repository,
        )
    }

    #[tokio::test]
    async fn test_create_persists_session() {
        let (manager, repository) = manager(ScriptedBackend::default());
        let session = manager.create("").await.unwrap();

        assert_eq!(session.title, DEFAULT_SESSION_TITLE);
        assert!(repository.find_by_id(&session.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_from_source_uses_derived_title() {
        let (manager, _) = manager(ScriptedBackend::with_title("How to cook pho"));
        let session = manager
            .create_from_source(" https://youtu.be/abc ", SourceKind::Youtube)
            .await
            .unwrap();

        assert_eq!(session.title, "How to cook pho");
        assert_eq!(session.source(), Some("https://youtu.be/abc"));
    }

    #[tokio::test]
    async fn test_create_from_source_falls_back_to_default_title() {
        let (manager, _) = manager(ScriptedBackend::default());
        let session = manager
            .create_from_source("https://youtu.be/abc", SourceKind::Youtube)
            .await
            .unwrap();
        assert_eq!(session.title, DEFAULT_SESSION_TITLE);
    }

    #[tokio::test]
    async fn test_create_from_invalid_source_is_rejected() {
        let (manager, repository) = manager(ScriptedBackend::default());
        let err = manager
            .create_from_source("   ", SourceKind::Youtube)
            .await
            .unwrap_err();

        assert!(err.is_intake());
        assert!(repository.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (manager, repository) = manager(ScriptedBackend::default());
        for (title, updated_at) in [("a", "2024-01-01T00:00:00Z"), ("b", "2024-05-01T00:00:00Z")] {
            let mut session = Session::new(title);
            session.updated_at = updated_at.to_string();
            repository.save(&session).await.unwrap();
        }

        let titles: Vec<String> = manager.list().await.unwrap().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_delete_then_load_is_not_found() {
        let (manager, _) = manager(ScriptedBackend::default());
        let session = manager.create("doomed").await.unwrap();

        manager.delete(&session.id).await.unwrap();

        assert!(manager.load(&session.id).await.unwrap_err().is_not_found());
        assert!(manager.delete(&session.id).await.unwrap_err().is_not_found());
    }
}
