//! Runs one generation as a single unit of work.
//!
//! A generation registers the session's source with the backend and then
//! requests the article. Either step failing fails the whole unit, and a
//! retry repeats both steps. Registering an already-registered source has
//! no additional effect on the backend.

use std::sync::Arc;
use vidwiki_core::Result;
use vidwiki_core::config::ModelConfigProvider;
use vidwiki_core::generation::{GeneratedArtifact, GenerationBackend, GenerationRequest};

pub struct GenerationOrchestrator {
    backend: Arc<dyn GenerationBackend>,
    models: Arc<dyn ModelConfigProvider>,
}

impl GenerationOrchestrator {
    pub fn new(backend: Arc<dyn GenerationBackend>, models: Arc<dyn ModelConfigProvider>) -> Self {
        Self { backend, models }
    }

    /// Sends the request and splits the answer into body and hashtags.
    ///
    /// One request at a time per session is the caller's responsibility.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedArtifact> {
        let provider = self.models.get_active_model_config().label();
        tracing::info!(
            "[GenerationOrchestrator] session {}: generating with {}",
            request.session_id,
            provider
        );

        let raw = match self.run(request).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(
                    "[GenerationOrchestrator] session {}: {}",
                    request.session_id,
                    e
                );
                return Err(e);
            }
        };

        let artifact = GeneratedArtifact::from_raw(&raw).with_provider(provider);
        tracing::info!(
            "[GenerationOrchestrator] session {}: {} chars, tags [{}]",
            request.session_id,
            artifact.body.chars().count(),
            artifact.tags
        );
        Ok(artifact)
    }

    async fn run(&self, request: &GenerationRequest) -> Result<String> {
        self.backend
            .register_source(
                &request.session_id,
                &request.source_reference,
                request.source_kind,
            )
            .await?;
        self.backend
            .generate(&request.session_id, &request.composed_prompt)
            .await
    }
}
