//! Saves one canonical document to several destinations.
//!
//! Targets run sequentially in a fixed order: Library, Drive, Sheet. The
//! library (the session store) is always written first, even when not
//! requested, and it is the only target that changes the session. External
//! sinks check readiness before writing. A failed target never stops the
//! ones after it and nothing is rolled back.

use crate::session::SessionUpdater;
use std::collections::BTreeSet;
use std::sync::Arc;
use vidwiki_core::session::{DraftPrompt, Session, SessionRepository, SourceKind};
use vidwiki_core::sink::{ExternalSink, PersistenceOutcome, SinkDocument, SinkTarget};

/// Everything a save writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub session_id: String,
    pub title: String,
    pub source_reference: Option<String>,
    pub source_kind: SourceKind,
    /// Merged body and tags.
    pub canonical_document: String,
    /// Draft used by the last successful generation, if any.
    pub draft_prompt: Option<DraftPrompt>,
    /// Composed prompt of the last successful generation, if any.
    pub composed_prompt: Option<String>,
}

/// Result of one save: one outcome per attempted target, in attempt order.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub outcomes: Vec<PersistenceOutcome>,
    /// The session as stored by the library write; `None` if that failed.
    pub saved_session: Option<Session>,
}

impl SaveReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(PersistenceOutcome::is_success)
    }

    pub fn outcome(&self, target: SinkTarget) -> Option<&PersistenceOutcome> {
        self.outcomes.iter().find(|o| o.sink == target)
    }

    /// One line per failed target, or `None` when everything succeeded.
    pub fn failure_summary(&self) -> Option<String> {
        let failures: Vec<String> = self
            .outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| format!("{}: {}", o.sink, o.detail))
            .collect();
        (!failures.is_empty()).then(|| failures.join("\n"))
    }
}

pub struct PersistenceCoordinator {
    updater: SessionUpdater,
    sinks: Vec<Arc<dyn ExternalSink>>,
}

impl PersistenceCoordinator {
    pub fn new(repository: Arc<dyn SessionRepository>, sinks: Vec<Arc<dyn ExternalSink>>) -> Self {
        Self {
            updater: SessionUpdater::new(repository),
            sinks,
        }
    }

    /// Readiness of every registered external sink, in save order.
    pub async fn check_sinks(&self) -> Vec<(SinkTarget, vidwiki_core::sink::SinkReadiness)> {
        let mut report = Vec::with_capacity(self.sinks.len());
        for sink in self.ordered_sinks() {
            report.push((sink.target(), sink.check_ready().await));
        }
        report
    }

    pub async fn save(&self, request: &SaveRequest, targets: &[SinkTarget]) -> SaveReport {
        let mut plan: BTreeSet<SinkTarget> = targets.iter().copied().collect();
        plan.insert(SinkTarget::Library);

        let saved_at = chrono::Utc::now().to_rfc3339();
        let mut outcomes = Vec::with_capacity(plan.len());
        let mut saved_session = None;

        for target in plan {
            let outcome = match target {
                SinkTarget::Library => match self.save_to_library(request).await {
                    Ok(session) => {
                        let outcome = PersistenceOutcome::success(
                            SinkTarget::Library,
                            format!("saved session {}", session.id),
                        );
                        saved_session = Some(session);
                        outcome
                    }
                    Err(e) => PersistenceOutcome::write_failed(SinkTarget::Library, e.to_string()),
                },
                external => {
                    let document = SinkDocument {
                        session_id: request.session_id.clone(),
                        title: saved_session
                            .as_ref()
                            .map_or_else(|| request.title.clone(), |s| s.title.clone()),
                        source_reference: request.source_reference.clone(),
                        content: request.canonical_document.clone(),
                        saved_at: saved_at.clone(),
                    };
                    self.save_to_sink(external, &document).await
                }
            };

            if outcome.is_success() {
                tracing::info!("[PersistenceCoordinator] {}: {}", outcome.sink, outcome.detail);
            } else {
                tracing::warn!("[PersistenceCoordinator] {} failed: {}", outcome.sink, outcome.detail);
            }
            outcomes.push(outcome);
        }

        SaveReport {
            outcomes,
            saved_session,
        }
    }

    async fn save_to_library(&self, request: &SaveRequest) -> vidwiki_core::Result<Session> {
        self.updater
            .update(&request.session_id, |session| {
                session.canonical_document = request.canonical_document.clone();
                if let Some(source) = &request.source_reference {
                    session.source_reference = Some(source.clone());
                    session.source_kind = request.source_kind;
                }
                if let Some(draft) = &request.draft_prompt {
                    session.draft_prompt = Some(draft.clone());
                }
                if let Some(prompt) = &request.composed_prompt {
                    session.record_prompt(prompt);
                }
                Ok(())
            })
            .await
    }

    async fn save_to_sink(&self, target: SinkTarget, document: &SinkDocument) -> PersistenceOutcome {
        let Some(sink) = self.sinks.iter().find(|s| s.target() == target) else {
            return PersistenceOutcome::not_ready(target, "no sink is registered for this target");
        };

        let readiness = sink.check_ready().await;
        if !readiness.ready {
            return PersistenceOutcome::not_ready(target, readiness.reason);
        }

        match sink.write(document).await {
            Ok(receipt) => PersistenceOutcome::success(
                target,
                receipt.link.unwrap_or_else(|| "saved".to_string()),
            ),
            Err(e) => PersistenceOutcome::write_failed(target, e.to_string()),
        }
    }

    fn ordered_sinks(&self) -> Vec<&Arc<dyn ExternalSink>> {
        let mut sinks: Vec<_> = self.sinks.iter().collect();
        sinks.sort_by_key(|s| s.target());
        sinks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemorySessionRepository, StaticSink};
    use std::sync::atomic::Ordering;
    use vidwiki_core::sink::{SinkFailure, SinkStatus};

    async fn stored_session(repository: &InMemorySessionRepository) -> Session {
        let mut session = Session::new("Pho");
        session.canonical_document = "old".to_string();
        repository.save(&session).await.unwrap();
        session
    }

    fn request(session: &Session) -> SaveRequest {
        SaveRequest {
            session_id: session.id.clone(),
            title: session.title.clone(),
            source_reference: Some("https://youtu.be/abc".to_string()),
            source_kind: SourceKind::Youtube,
            canonical_document: "Body\n\n#food".to_string(),
            draft_prompt: Some(DraftPrompt::new("Cover the recipe")),
            composed_prompt: Some("Content requirements:\nCover the recipe".to_string()),
        }
    }

    #[tokio::test]
    async fn test_library_is_always_first() {
        let repository = Arc::new(InMemorySessionRepository::default());
        let session = stored_session(&repository).await;
        let coordinator = PersistenceCoordinator::new(
            repository.clone(),
            vec![
                Arc::new(StaticSink::ok(SinkTarget::Sheet, "sheet-link")),
                Arc::new(StaticSink::ok(SinkTarget::Drive, "drive-link")),
            ],
        );

        let report = coordinator
            .save(&request(&session), &[SinkTarget::Sheet, SinkTarget::Drive])
            .await;

        let order: Vec<SinkTarget> = report.outcomes.iter().map(|o| o.sink).collect();
        assert_eq!(
            order,
            vec![SinkTarget::Library, SinkTarget::Drive, SinkTarget::Sheet]
        );
        assert!(report.all_succeeded());
        assert_eq!(report.outcome(SinkTarget::Drive).unwrap().detail, "drive-link");

        let stored = repository.find_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.canonical_document, "Body\n\n#food");
        assert_eq!(stored.prompt_history.len(), 1);
        assert_eq!(stored.source(), Some("https://youtu.be/abc"));
    }

    #[tokio::test]
    async fn test_unready_sink_is_skipped_without_write() {
        let repository = Arc::new(InMemorySessionRepository::default());
        let session = stored_session(&repository).await;
        let drive = Arc::new(StaticSink::not_ready(SinkTarget::Drive, "credentials.json missing"));
        let sheet = Arc::new(StaticSink::ok(SinkTarget::Sheet, "sheet-link"));
        let coordinator =
            PersistenceCoordinator::new(repository, vec![drive.clone(), sheet.clone()]);

        let report = coordinator
            .save(&request(&session), &[SinkTarget::Drive, SinkTarget::Sheet])
            .await;

        let drive_outcome = report.outcome(SinkTarget::Drive).unwrap();
        assert_eq!(drive_outcome.status, SinkStatus::Failure);
        assert_eq!(drive_outcome.failure, Some(SinkFailure::NotReady));
        assert_eq!(drive_outcome.detail, "not configured: credentials.json missing");
        assert_eq!(drive.write_count(), 0);
        assert_eq!(sheet.write_count(), 1);
        assert!(report.outcome(SinkTarget::Sheet).unwrap().is_success());
    }

    #[tokio::test]
    async fn test_library_failure_does_not_block_external_sinks() {
        let repository = Arc::new(InMemorySessionRepository::default());
        let session = stored_session(&repository).await;
        repository.fail_saves.store(true, Ordering::SeqCst);
        let drive = Arc::new(StaticSink::ok(SinkTarget::Drive, "drive-link"));
        let coordinator = PersistenceCoordinator::new(repository.clone(), vec![drive.clone()]);

        let report = coordinator.save(&request(&session), &[SinkTarget::Drive]).await;

        assert_eq!(
            report.outcome(SinkTarget::Library).unwrap().failure,
            Some(SinkFailure::WriteFailed)
        );
        assert!(report.saved_session.is_none());
        assert!(report.outcome(SinkTarget::Drive).unwrap().is_success());
        assert_eq!(drive.written.lock().unwrap()[0].title, "Pho");

        let stored = repository.find_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.canonical_document, "old");
    }

    #[tokio::test]
    async fn test_write_failure_is_reported_per_sink() {
        let repository = Arc::new(InMemorySessionRepository::default());
        let session = stored_session(&repository).await;
        let coordinator = PersistenceCoordinator::new(
            repository,
            vec![Arc::new(StaticSink::failing(SinkTarget::Sheet, "quota exceeded"))],
        );

        let report = coordinator
            .save(&request(&session), &[SinkTarget::Sheet, SinkTarget::Drive])
            .await;

        assert_eq!(report.outcomes.len(), 3);
        let drive = report.outcome(SinkTarget::Drive).unwrap();
        assert_eq!(drive.failure, Some(SinkFailure::NotReady));
        let sheet = report.outcome(SinkTarget::Sheet).unwrap();
        assert_eq!(sheet.failure, Some(SinkFailure::WriteFailed));
        assert!(sheet.detail.contains("quota exceeded"));
        assert!(report.failure_summary().unwrap().contains("sheet: "));
    }

    #[tokio::test]
    async fn test_check_sinks_in_save_order() {
        let coordinator = PersistenceCoordinator::new(
            Arc::new(InMemorySessionRepository::default()),
            vec![
                Arc::new(StaticSink::ok(SinkTarget::Sheet, "x")),
                Arc::new(StaticSink::not_ready(SinkTarget::Drive, "no token")),
            ],
        );

        let report = coordinator.check_sinks().await;
        assert_eq!(report[0].0, SinkTarget::Drive);
        assert!(!report[0].1.ready);
        assert!(report[1].1.ready);
    }
}
