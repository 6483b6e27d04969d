use crate::generation_orchestrator::GenerationOrchestrator;
use crate::persistence_coordinator::PersistenceCoordinator;
use crate::session::SessionLifecycleManager;
use crate::workspace_usecase::WorkspaceUseCase;
use std::sync::Arc;
use vidwiki_core::config::{ModelConfigProvider, WorkspaceSettings};
use vidwiki_core::confirmation::{ConfirmableAction, ConfirmationGate, ConfirmationToken};
use vidwiki_core::generation::GenerationBackend;
use vidwiki_core::session::{Session, SessionRepository, SourceKind};
use vidwiki_core::sink::{ExternalSink, SinkReadiness, SinkTarget};
use vidwiki_core::{Result, VidwikiError};
use vidwiki_infrastructure::{
    ConfigService, TomlSessionRepository, VidwikiPaths, google_sinks,
};
use vidwiki_interaction::RemoteGenerationBackend;

/// The shared services of one application instance.
///
/// Cheap to clone. Every workspace opened from the same `AppServices`
/// shares its repository, backend, sinks and confirmation gate.
#[derive(Clone)]
pub struct AppServices {
    pub lifecycle: Arc<SessionLifecycleManager>,
    pub orchestrator: Arc<GenerationOrchestrator>,
    pub coordinator: Arc<PersistenceCoordinator>,
    pub confirmations: Arc<ConfirmationGate>,
    pub settings: WorkspaceSettings,
}

impl AppServices {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        backend: Arc<dyn GenerationBackend>,
        models: Arc<dyn ModelConfigProvider>,
        sinks: Vec<Arc<dyn ExternalSink>>,
        settings: WorkspaceSettings,
    ) -> Self {
        Self {
            lifecycle: Arc::new(SessionLifecycleManager::new(
                repository.clone(),
                backend.clone(),
            )),
            orchestrator: Arc::new(GenerationOrchestrator::new(backend, models)),
            coordinator: Arc::new(PersistenceCoordinator::new(repository, sinks)),
            confirmations: Arc::new(ConfirmationGate::default()),
            settings,
        }
    }

    /// Wires the production services from the config directory.
    pub fn bootstrap(paths: &VidwikiPaths) -> Result<Self> {
        let config_service = ConfigService::new(paths.config_file());
        let config = config_service.try_get_config()?;

        let repository = TomlSessionRepository::default_location(paths)?;
        let backend = RemoteGenerationBackend::from_settings(&config.generation)?;
        let sinks = google_sinks(&config, paths);

        tracing::info!(
            "[AppServices] sessions in {}, backend {}, {} external sink(s)",
            repository.sessions_dir().display(),
            backend.base_url(),
            sinks.len()
        );

        Ok(Self::new(
            Arc::new(repository),
            Arc::new(backend),
            Arc::new(config_service),
            sinks,
            config.workspace,
        ))
    }

    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.lifecycle.list().await
    }

    pub async fn create_session(&self, title: &str) -> Result<Session> {
        self.lifecycle.create(title).await
    }

    pub async fn create_session_from_source(
        &self,
        source_reference: &str,
        kind: SourceKind,
    ) -> Result<Session> {
        self.lifecycle.create_from_source(source_reference, kind).await
    }

    pub async fn open_workspace(&self, session_id: &str) -> Result<WorkspaceUseCase> {
        WorkspaceUseCase::open(self.clone(), session_id).await
    }

    pub async fn check_sinks(&self) -> Vec<(SinkTarget, SinkReadiness)> {
        self.coordinator.check_sinks().await
    }

    /// Asks for confirmation before deleting a session.
    pub fn request_delete(&self, session_id: &str) -> ConfirmationToken {
        self.confirmations
            .request_confirmation(ConfirmableAction::DeleteSession {
                session_id: session_id.to_string(),
            })
    }

    /// Deletes the session named by a delete token.
    pub async fn execute_delete(&self, token: &ConfirmationToken) -> Result<()> {
        let session_id = match token.action() {
            ConfirmableAction::DeleteSession { session_id } => session_id.clone(),
            other => {
                return Err(VidwikiError::Confirmation(format!(
                    "expected a delete token, got '{}'",
                    other.prompt()
                )));
            }
        };
        self.confirmations.redeem(token)?;
        self.lifecycle.delete(&session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemorySessionRepository, ScriptedBackend, StaticModels};
    use vidwiki_core::config::ModelConfig;

    fn services() -> AppServices {
        AppServices::new(
            Arc::new(InMemorySessionRepository::default()),
            Arc::new(ScriptedBackend::default()),
            Arc::new(StaticModels(ModelConfig::local_fallback())),
            Vec::new(),
            WorkspaceSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_delete_requires_redeemed_token() {
        let services = services();
        let session = services.create_session("doomed").await.unwrap();

        let token = services.request_delete(&session.id);
        services.execute_delete(&token).await.unwrap();

        assert!(services.list_sessions().await.unwrap().is_empty());
        assert!(matches!(
            services.execute_delete(&token).await,
            Err(VidwikiError::Confirmation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_rejects_save_token() {
        let services = services();
        let session = services.create_session("kept").await.unwrap();
        let token = services
            .confirmations
            .request_confirmation(ConfirmableAction::SaveToSinks {
                session_id: session.id.clone(),
                targets: vec![SinkTarget::Drive],
            });

        assert!(services.execute_delete(&token).await.is_err());
        assert_eq!(services.list_sessions().await.unwrap().len(), 1);
        assert!(services.confirmations.redeem(&token).is_ok());
    }

    #[tokio::test]
    async fn test_deleting_missing_session_is_not_found() {
        let services = services();
        let token = services.request_delete("ghost");
        assert!(services.execute_delete(&token).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_bootstrap_from_empty_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let services = AppServices::bootstrap(&VidwikiPaths::with_root(dir.path())).unwrap();

        assert!(services.list_sessions().await.unwrap().is_empty());
        assert!(!services.settings.direct_mode);
        let sinks = services.check_sinks().await;
        assert!(sinks.iter().all(|(_, readiness)| !readiness.ready));
    }
}
