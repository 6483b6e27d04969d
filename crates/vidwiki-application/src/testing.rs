//! In-memory collaborators for unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use vidwiki_core::config::{ModelConfig, ModelConfigProvider};
use vidwiki_core::error::GenerationStage;
use vidwiki_core::generation::GenerationBackend;
use vidwiki_core::session::{Session, SessionRepository, SourceKind};
use vidwiki_core::sink::{ExternalSink, SinkDocument, SinkReadiness, SinkReceipt, SinkTarget};
use vidwiki_core::{Result, VidwikiError};

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<String, Session>>,
    pub fail_saves: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(VidwikiError::io("disk full"));
        }
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Session>> {
        Ok(self.sessions.lock().unwrap().values().cloned().collect())
    }
}

/// Backend whose answers are queued up front.
#[derive(Default)]
pub struct ScriptedBackend {
    title: Option<String>,
    register_error: Option<VidwikiError>,
    responses: Mutex<VecDeque<Result<String>>>,
    pub prompts: Mutex<Vec<String>>,
    pub register_calls: AtomicUsize,
    pub generate_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn with_title(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_registration() -> Self {
        Self {
            register_error: Some(VidwikiError::generation(
                GenerationStage::RegisterSource,
                "unreachable",
                true,
            )),
            ..Self::default()
        }
    }

    pub fn respond(self, response: Result<String>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn register_source(&self, _: &str, _: &str, _: SourceKind) -> Result<()> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        match &self.register_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn generate(&self, _: &str, prompt: &str) -> Result<String> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Generated article #seo".to_string()))
    }

    async fn derive_title(&self, _: &str) -> Result<String> {
        self.title.clone().ok_or_else(|| {
            VidwikiError::generation(GenerationStage::DeriveTitle, "no title", false)
        })
    }
}

/// Sink with fixed readiness and write result.
pub struct StaticSink {
    target: SinkTarget,
    readiness: SinkReadiness,
    result: Result<SinkReceipt>,
    pub written: Mutex<Vec<SinkDocument>>,
}

impl StaticSink {
    pub fn ok(target: SinkTarget, link: &str) -> Self {
        Self {
            target,
            readiness: SinkReadiness::ready(),
            result: Ok(SinkReceipt {
                link: Some(link.to_string()),
            }),
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn not_ready(target: SinkTarget, reason: &str) -> Self {
        Self {
            readiness: SinkReadiness::not_ready(reason),
            ..Self::ok(target, "unused")
        }
    }

    pub fn failing(target: SinkTarget, message: &str) -> Self {
        Self {
            result: Err(VidwikiError::sink_write(target.to_string(), message)),
            ..Self::ok(target, "unused")
        }
    }

    pub fn write_count(&self) -> usize {
        self.written.lock().unwrap().len()
    }
}

#[async_trait]
impl ExternalSink for StaticSink {
    fn target(&self) -> SinkTarget {
        self.target
    }

    async fn check_ready(&self) -> SinkReadiness {
        self.readiness.clone()
    }

    async fn write(&self, document: &SinkDocument) -> Result<SinkReceipt> {
        self.written.lock().unwrap().push(document.clone());
        self.result.clone()
    }
}

pub struct StaticModels(pub ModelConfig);

impl ModelConfigProvider for StaticModels {
    fn get_active_model_config(&self) -> ModelConfig {
        self.0.clone()
    }
}
