//! Workflow state machine for one viewing of a session.
//!
//! The wizard walks a session through three phases:
//!
//! ```text
//! Intake ──submit──▶ Configure ──generate──▶ Result ◀─┐
//!    │                   ▲                     │      │ regenerate
//!    └──submit (direct)──┼─────────────────────▶──────┘
//!                        └──── generation failure
//! ```
//!
//! In direct mode `Configure` is skipped once both a source reference and a
//! draft prompt are present, and a failed generation falls back to `Intake`.
//! While `processing` is set, every trigger that would leave the step or start
//! another request is refused.

use crate::error::{Result, VidwikiError};
use crate::session::{DraftPrompt, Session};
use serde::{Deserialize, Serialize};

/// The phase a session view is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WizardStep {
    /// Collecting the source reference.
    Intake,
    /// Editing the prompt before generation.
    Configure,
    /// Showing (and editing) a generated article.
    Result,
}

/// What an accepted intake submission leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeTransition {
    /// The prompt must be configured next.
    Configure,
    /// Direct mode: generation starts immediately.
    StartGeneration,
}

/// Ephemeral wizard state held for one viewing of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    step: WizardStep,
    processing: bool,
    direct_mode: bool,
    closed: bool,
    last_error: Option<String>,
}

impl WizardState {
    /// Creates a wizard positioned at `Intake`.
    pub fn new(direct_mode: bool) -> Self {
        Self {
            step: WizardStep::Intake,
            processing: false,
            direct_mode,
            closed: false,
            last_error: None,
        }
    }

    /// Creates the wizard for a freshly loaded session.
    ///
    /// A session that was saved before opens directly in `Result`.
    pub fn for_session(session: &Session, direct_mode: bool) -> Self {
        let mut state = Self::new(direct_mode);
        if session.has_saved_document() {
            state.step = WizardStep::Result;
        }
        state
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// True once the view was left for the dashboard.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The error of the last failed action, if the last action failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Submits the source reference entered at `Intake`.
    ///
    /// Returns the validated reference together with the transition taken.
    pub fn submit_intake(
        &mut self,
        source_reference: &str,
        draft: Option<&DraftPrompt>,
    ) -> Result<(String, IntakeTransition)> {
        self.ensure_idle("submit")?;
        self.ensure_step(WizardStep::Intake, "submit")?;

        let source = match validate_source_reference(source_reference) {
            Ok(source) => source,
            Err(err) => {
                self.last_error = Some(err.to_string());
                return Err(err);
            }
        };
        self.last_error = None;

        let has_draft = draft.is_some_and(|d| !d.is_empty());
        if self.direct_mode && has_draft {
            self.step = WizardStep::Result;
            self.processing = true;
            tracing::debug!("[Wizard] intake -> result (direct), processing");
            Ok((source, IntakeTransition::StartGeneration))
        } else {
            self.step = WizardStep::Configure;
            tracing::debug!("[Wizard] intake -> configure");
            Ok((source, IntakeTransition::Configure))
        }
    }

    /// Starts a generation from `Configure` or `Result`.
    ///
    /// Returns `Ok(false)` without changing anything when a request is
    /// already outstanding.
    pub fn begin_generation(&mut self) -> Result<bool> {
        if self.processing {
            tracing::debug!("[Wizard] generation trigger ignored while processing");
            return Ok(false);
        }
        match self.step {
            WizardStep::Configure | WizardStep::Result => {}
            WizardStep::Intake if self.direct_mode => {}
            step => return Err(invalid(step, "generate")),
        }

        self.step = WizardStep::Result;
        self.processing = true;
        self.last_error = None;
        tracing::debug!("[Wizard] -> result, processing");
        Ok(true)
    }

    /// Records a successful generation.
    pub fn complete_generation(&mut self) {
        self.step = WizardStep::Result;
        self.processing = false;
        self.last_error = None;
    }

    /// Records a failed generation and returns to the step that collects
    /// the failed input.
    pub fn fail_generation(&mut self, error: &VidwikiError) {
        self.step = if self.direct_mode {
            WizardStep::Intake
        } else {
            WizardStep::Configure
        };
        self.processing = false;
        self.last_error = Some(error.to_string());
        tracing::debug!("[Wizard] generation failed -> {}", self.step);
    }

    /// Starts a save. Only allowed from `Result`.
    ///
    /// Returns `Ok(false)` without changing anything when a request is
    /// already outstanding.
    pub fn begin_save(&mut self) -> Result<bool> {
        if self.processing {
            tracing::debug!("[Wizard] save trigger ignored while processing");
            return Ok(false);
        }
        self.ensure_step(WizardStep::Result, "save")?;
        self.processing = true;
        self.last_error = None;
        Ok(true)
    }

    /// Records the end of a save; `error` carries the failure to surface.
    pub fn finish_save(&mut self, error: Option<String>) {
        self.processing = false;
        self.last_error = error;
    }

    /// Steps back one phase.
    ///
    /// `Configure` and `Result` go back to `Intake`; going back from
    /// `Intake` closes the view.
    pub fn back(&mut self) -> Result<WizardStep> {
        self.ensure_idle("go back")?;
        match self.step {
            WizardStep::Intake => self.closed = true,
            WizardStep::Configure | WizardStep::Result => self.step = WizardStep::Intake,
        }
        tracing::debug!("[Wizard] back -> {} (closed={})", self.step, self.closed);
        Ok(self.step)
    }

    /// Leaves the view for the dashboard.
    pub fn close(&mut self) -> Result<()> {
        self.ensure_idle("close")?;
        self.closed = true;
        Ok(())
    }

    fn ensure_idle(&self, trigger: &str) -> Result<()> {
        if self.processing {
            return Err(VidwikiError::InvalidTransition {
                step: format!("{} (processing)", self.step),
                trigger: trigger.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_step(&self, expected: WizardStep, trigger: &str) -> Result<()> {
        if self.step != expected {
            return Err(invalid(self.step, trigger));
        }
        Ok(())
    }
}

fn invalid(step: WizardStep, trigger: &str) -> VidwikiError {
    VidwikiError::InvalidTransition {
        step: step.to_string(),
        trigger: trigger.to_string(),
    }
}

/// Checks a user-supplied source reference and returns it trimmed.
///
/// A reference is either an `http(s)` URL or a bare identifier such as a
/// YouTube video id. It must not be blank or contain whitespace.
pub fn validate_source_reference(source_reference: &str) -> Result<String> {
    let source = source_reference.trim();

    if source.is_empty() {
        return Err(VidwikiError::intake("a source reference is required"));
    }
    if source.chars().any(char::is_whitespace) {
        return Err(VidwikiError::intake(format!(
            "'{source}' must not contain whitespace"
        )));
    }
    if let Some((scheme, rest)) = source.split_once("://") {
        if !matches!(scheme.to_ascii_lowercase().as_str(), "http" | "https") {
            return Err(VidwikiError::intake(format!(
                "unsupported scheme '{scheme}'"
            )));
        }
        if rest.is_empty() {
            return Err(VidwikiError::intake(format!("'{source}' has no host")));
        }
    }

    Ok(source.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIDEO: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[test]
    fn test_submit_moves_to_configure() {
        let mut wizard = WizardState::new(false);
        let (source, transition) = wizard.submit_intake(VIDEO, None).unwrap();
        assert_eq!(source, VIDEO);
        assert_eq!(transition, IntakeTransition::Configure);
        assert_eq!(wizard.step(), WizardStep::Configure);
        assert!(!wizard.is_processing());
    }

    #[test]
    fn test_submit_rejects_empty_source() {
        let mut wizard = WizardState::new(false);
        let err = wizard.submit_intake("   ", None).unwrap_err();
        assert!(err.is_intake());
        assert_eq!(wizard.step(), WizardStep::Intake);
        assert!(wizard.last_error().is_some());
    }

    #[test]
    fn test_direct_mode_skips_configure_when_draft_present() {
        let mut wizard = WizardState::new(true);
        let draft = DraftPrompt::new("Write the post");
        let (_, transition) = wizard.submit_intake(VIDEO, Some(&draft)).unwrap();
        assert_eq!(transition, IntakeTransition::StartGeneration);
        assert_eq!(wizard.step(), WizardStep::Result);
        assert!(wizard.is_processing());
    }

    #[test]
    fn test_direct_mode_without_draft_still_configures() {
        let mut wizard = WizardState::new(true);
        let (_, transition) = wizard.submit_intake(VIDEO, None).unwrap();
        assert_eq!(transition, IntakeTransition::Configure);
    }

    #[test]
    fn test_second_generation_trigger_is_ignored() {
        let mut wizard = WizardState::new(false);
        wizard.submit_intake(VIDEO, None).unwrap();
        assert!(wizard.begin_generation().unwrap());
        assert!(!wizard.begin_generation().unwrap());
        assert!(!wizard.begin_save().unwrap());
        assert!(wizard.is_processing());
    }

    #[test]
    fn test_generation_failure_returns_to_configure() {
        let mut wizard = WizardState::new(false);
        wizard.submit_intake(VIDEO, None).unwrap();
        wizard.begin_generation().unwrap();
        let err = VidwikiError::generation(
            crate::error::GenerationStage::Generate,
            "backend down",
            true,
        );
        wizard.fail_generation(&err);
        assert_eq!(wizard.step(), WizardStep::Configure);
        assert!(!wizard.is_processing());
        assert!(wizard.last_error().unwrap().contains("backend down"));
    }

    #[test]
    fn test_direct_mode_failure_returns_to_intake() {
        let mut wizard = WizardState::new(true);
        wizard
            .submit_intake(VIDEO, Some(&DraftPrompt::new("x")))
            .unwrap();
        wizard.fail_generation(&VidwikiError::internal("boom"));
        assert_eq!(wizard.step(), WizardStep::Intake);
        assert!(!wizard.is_processing());
    }

    #[test]
    fn test_generation_from_intake_is_rejected_outside_direct_mode() {
        let mut wizard = WizardState::new(false);
        assert!(matches!(
            wizard.begin_generation(),
            Err(VidwikiError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_back_is_refused_while_processing() {
        let mut wizard = WizardState::new(false);
        wizard.submit_intake(VIDEO, None).unwrap();
        wizard.begin_generation().unwrap();
        assert!(wizard.back().is_err());
        assert!(wizard.close().is_err());
        wizard.complete_generation();
        assert_eq!(wizard.back().unwrap(), WizardStep::Intake);
        wizard.back().unwrap();
        assert!(wizard.is_closed());
    }

    #[test]
    fn test_saved_session_opens_in_result() {
        let mut session = Session::new("saved");
        session.canonical_document = "Hello #World".to_string();
        let wizard = WizardState::for_session(&session, false);
        assert_eq!(wizard.step(), WizardStep::Result);

        let fresh = WizardState::for_session(&Session::new("fresh"), false);
        assert_eq!(fresh.step(), WizardStep::Intake);
    }

    #[test]
    fn test_save_requires_result_step() {
        let mut wizard = WizardState::new(false);
        assert!(wizard.begin_save().is_err());
    }

    #[test]
    fn test_validate_source_reference() {
        assert_eq!(validate_source_reference("  dQw4w9WgXcQ ").unwrap(), "dQw4w9WgXcQ");
        assert!(validate_source_reference("ftp://example.com/video").is_err());
        assert!(validate_source_reference("https://").is_err());
        assert!(validate_source_reference("two words").is_err());
    }
}
