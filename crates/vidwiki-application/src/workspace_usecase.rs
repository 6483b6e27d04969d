//! The workspace: one open session and its workflow.
//!
//! A [`WorkspaceUseCase`] owns the [`SessionContext`] of one viewing of a
//! session. The context sits behind an async mutex that is released while
//! the backend or the sinks are working; the wizard's `processing` flag is
//! what keeps a second generation or save from starting meanwhile.

use crate::app_services::AppServices;
use crate::persistence_coordinator::SaveRequest;
use tokio::sync::Mutex;
use vidwiki_core::confirmation::{ConfirmableAction, ConfirmationToken};
use vidwiki_core::generation::{GeneratedArtifact, GenerationRequest};
use vidwiki_core::hashtag;
use vidwiki_core::session::{DraftPrompt, Session};
use vidwiki_core::sink::{PersistenceOutcome, SinkTarget};
use vidwiki_core::wizard::{IntakeTransition, WizardState, WizardStep};
use vidwiki_core::{Result, VidwikiError};

/// Everything the workspace knows about the open session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    /// The session as last loaded or saved, plus in-memory changes from
    /// successful generations.
    pub session: Session,
    pub wizard: WizardState,
    /// Working copy of the prompt being edited.
    pub draft: DraftPrompt,
    /// The article currently shown, if any.
    pub artifact: Option<GeneratedArtifact>,
    /// Composed prompt of the last successful generation.
    pub last_composed_prompt: Option<String>,
    /// Outcomes of the last save.
    pub last_outcomes: Vec<PersistenceOutcome>,
}

/// Result of a generation trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Generated(GeneratedArtifact),
    /// Another request was outstanding; nothing happened.
    Ignored,
}

/// Result of a save trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(Vec<PersistenceOutcome>),
    /// Another request was outstanding; nothing happened.
    Ignored,
}

/// Result of submitting a source at intake.
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    /// The prompt can now be configured.
    AwaitingConfiguration,
    /// Direct mode started a generation right away.
    Generation(GenerationOutcome),
}

pub struct WorkspaceUseCase {
    services: AppServices,
    context: Mutex<SessionContext>,
}

impl WorkspaceUseCase {
    /// Opens a session.
    ///
    /// A session with a saved document opens at `Result`, its body and tags
    /// recovered from the canonical document.
    pub async fn open(services: AppServices, session_id: &str) -> Result<Self> {
        let session = services.lifecycle.load(session_id).await?;
        let settings = &services.settings;

        let wizard = WizardState::for_session(&session, settings.direct_mode);
        let draft = session.draft_prompt.clone().unwrap_or_else(|| {
            DraftPrompt::new(settings.default_content_intent.clone())
                .with_style(settings.default_style_intent.clone())
        });
        let artifact = session
            .has_saved_document()
            .then(|| GeneratedArtifact::from_canonical(&session.canonical_document));

        tracing::debug!(
            "[Workspace] opened session {} at {}",
            session.id,
            wizard.step()
        );

        Ok(Self {
            services,
            context: Mutex::new(SessionContext {
                session,
                wizard,
                draft,
                artifact,
                last_composed_prompt: None,
                last_outcomes: Vec::new(),
            }),
        })
    }

    /// A copy of the current context.
    pub async fn snapshot(&self) -> SessionContext {
        self.context.lock().await.clone()
    }

    pub async fn step(&self) -> WizardStep {
        self.context.lock().await.wizard.step()
    }

    /// Submits the source reference typed at intake.
    pub async fn submit_source(&self, source_reference: &str) -> Result<IntakeOutcome> {
        let (request, draft) = {
            let mut ctx = self.context.lock().await;
            let ctx = &mut *ctx;
            ensure_open(ctx)?;
            let stored_draft = ctx.session.draft_prompt.as_ref().map(|_| &ctx.draft);
            let (source, transition) = ctx.wizard.submit_intake(source_reference, stored_draft)?;
            ctx.session.source_reference = Some(source.clone());

            match transition {
                IntakeTransition::Configure => return Ok(IntakeOutcome::AwaitingConfiguration),
                IntakeTransition::StartGeneration => (
                    GenerationRequest::new(
                        ctx.session.id.clone(),
                        source,
                        ctx.session.source_kind,
                        &ctx.draft,
                    ),
                    ctx.draft.clone(),
                ),
            }
        };

        self.run_generation(request, draft)
            .await
            .map(IntakeOutcome::Generation)
    }

    /// Replaces the content intent of the working draft.
    pub async fn set_content_intent(&self, content_intent: &str) {
        self.context.lock().await.draft.content_intent = content_intent.to_string();
    }

    /// Replaces the style intent of the working draft. Blank clears it.
    pub async fn set_style_intent(&self, style_intent: &str) {
        let mut ctx = self.context.lock().await;
        ctx.draft = ctx.draft.clone().with_style(style_intent);
    }

    /// Generates (or regenerates) the article from the working draft.
    ///
    /// Returns [`GenerationOutcome::Ignored`] while another generation or
    /// save is outstanding. On failure the wizard falls back to the step
    /// that collects the failed input and the error is returned; the draft,
    /// the saved document and the previous article are kept.
    pub async fn generate(&self) -> Result<GenerationOutcome> {
        let (request, draft) = {
            let mut ctx = self.context.lock().await;
            ensure_open(&ctx)?;
            if ctx.wizard.is_processing() {
                tracing::debug!("[Workspace] generate ignored: request outstanding");
                return Ok(GenerationOutcome::Ignored);
            }
            let source = ctx
                .session
                .source()
                .map(str::to_string)
                .ok_or_else(|| VidwikiError::intake("a source reference is required"))?;
            if !ctx.wizard.begin_generation()? {
                return Ok(GenerationOutcome::Ignored);
            }
            (
                GenerationRequest::new(
                    ctx.session.id.clone(),
                    source,
                    ctx.session.source_kind,
                    &ctx.draft,
                ),
                ctx.draft.clone(),
            )
        };

        self.run_generation(request, draft).await
    }

    async fn run_generation(
        &self,
        request: GenerationRequest,
        draft: DraftPrompt,
    ) -> Result<GenerationOutcome> {
        let result = self.services.orchestrator.generate(&request).await;

        let mut ctx = self.context.lock().await;
        match result {
            Ok(artifact) => {
                ctx.wizard.complete_generation();
                ctx.session.draft_prompt = Some(draft);
                ctx.last_composed_prompt = Some(request.composed_prompt);
                ctx.artifact = Some(artifact.clone());
                Ok(GenerationOutcome::Generated(artifact))
            }
            Err(e) => {
                ctx.wizard.fail_generation(&e);
                Err(e)
            }
        }
    }

    /// Replaces the article body.
    pub async fn edit_body(&self, body: &str) -> Result<()> {
        let mut ctx = self.context.lock().await;
        editable_artifact(&mut ctx)?.body = body.to_string();
        Ok(())
    }

    /// Replaces the tag list, normalizing separators and `#` prefixes.
    pub async fn edit_tags(&self, tags: &str) -> Result<()> {
        let mut ctx = self.context.lock().await;
        editable_artifact(&mut ctx)?.tags = hashtag::normalize_tags(tags);
        Ok(())
    }

    /// Saves the current article to the library and the given targets.
    ///
    /// Returns [`SaveOutcome::Ignored`] while another generation or save is
    /// outstanding.
    pub async fn save(&self, targets: &[SinkTarget]) -> Result<SaveOutcome> {
        let request = {
            let mut ctx = self.context.lock().await;
            ensure_open(&ctx)?;
            if ctx.wizard.is_processing() {
                tracing::debug!("[Workspace] save ignored: request outstanding");
                return Ok(SaveOutcome::Ignored);
            }
            let Some(artifact) = ctx.artifact.as_ref() else {
                return Err(VidwikiError::InvalidTransition {
                    step: ctx.wizard.step().to_string(),
                    trigger: "save without an article".to_string(),
                });
            };
            let canonical_document = artifact.canonical_document();
            if !ctx.wizard.begin_save()? {
                return Ok(SaveOutcome::Ignored);
            }
            SaveRequest {
                session_id: ctx.session.id.clone(),
                title: ctx.session.title.clone(),
                source_reference: ctx.session.source_reference.clone(),
                source_kind: ctx.session.source_kind,
                canonical_document,
                draft_prompt: ctx.session.draft_prompt.clone(),
                composed_prompt: ctx.last_composed_prompt.clone(),
            }
        };

        let report = self.services.coordinator.save(&request, targets).await;
        if report.all_succeeded() {
            tracing::info!(
                "[Workspace] session {} saved to {} target(s)",
                request.session_id,
                report.outcomes.len()
            );
        }

        let mut ctx = self.context.lock().await;
        if let Some(saved) = report.saved_session.clone() {
            ctx.session = saved;
        }
        ctx.last_outcomes = report.outcomes.clone();
        ctx.wizard.finish_save(report.failure_summary());
        Ok(SaveOutcome::Saved(report.outcomes))
    }

    /// Asks for confirmation before saving to external targets.
    pub async fn request_save(&self, targets: &[SinkTarget]) -> ConfirmationToken {
        let session_id = self.context.lock().await.session.id.clone();
        self.services
            .confirmations
            .request_confirmation(ConfirmableAction::SaveToSinks {
                session_id,
                targets: targets.to_vec(),
            })
    }

    /// Runs a save confirmed through [`Self::request_save`].
    pub async fn save_confirmed(&self, token: &ConfirmationToken) -> Result<SaveOutcome> {
        let session_id = self.context.lock().await.session.id.clone();
        let targets = match token.action() {
            ConfirmableAction::SaveToSinks {
                session_id: target_session,
                targets,
            } if *target_session == session_id => targets.clone(),
            _ => {
                return Err(VidwikiError::Confirmation(
                    "token does not authorize saving this session".to_string(),
                ));
            }
        };
        self.services.confirmations.redeem(token)?;
        self.save(&targets).await
    }

    /// Asks for confirmation before deleting the open session.
    pub async fn request_delete(&self) -> ConfirmationToken {
        let session_id = self.context.lock().await.session.id.clone();
        self.services.request_delete(&session_id)
    }

    /// Deletes the open session and closes the view.
    pub async fn delete_confirmed(&self, token: &ConfirmationToken) -> Result<()> {
        {
            let ctx = self.context.lock().await;
            let authorized = matches!(
                token.action(),
                ConfirmableAction::DeleteSession { session_id } if *session_id == ctx.session.id
            );
            if !authorized {
                return Err(VidwikiError::Confirmation(
                    "token does not authorize deleting this session".to_string(),
                ));
            }
            if ctx.wizard.is_processing() {
                return Err(VidwikiError::Busy(ctx.session.id.clone()));
            }
        }

        self.services.execute_delete(token).await?;

        let mut ctx = self.context.lock().await;
        ctx.wizard.close().or_else(|_| {
            // A generation started meanwhile; the session is gone either way.
            tracing::warn!("[Workspace] session {} deleted while busy", ctx.session.id);
            Ok(())
        })
    }

    /// Steps back one phase; from `Intake` this closes the view.
    pub async fn back(&self) -> Result<WizardStep> {
        self.context.lock().await.wizard.back()
    }

    /// Leaves the workspace for the dashboard.
    pub async fn close(&self) -> Result<()> {
        self.context.lock().await.wizard.close()
    }
}

fn ensure_open(ctx: &SessionContext) -> Result<()> {
    if ctx.wizard.is_closed() {
        return Err(VidwikiError::InvalidTransition {
            step: ctx.wizard.step().to_string(),
            trigger: "use of a closed workspace".to_string(),
        });
    }
    Ok(())
}

fn editable_artifact(ctx: &mut SessionContext) -> Result<&mut GeneratedArtifact> {
    if ctx.wizard.is_processing() {
        return Err(VidwikiError::Busy(ctx.session.id.clone()));
    }
    let step = ctx.wizard.step();
    ctx.artifact
        .as_mut()
        .filter(|_| step == WizardStep::Result)
        .ok_or_else(|| VidwikiError::InvalidTransition {
            step: step.to_string(),
            trigger: "edit".to_string(),
        })
}
