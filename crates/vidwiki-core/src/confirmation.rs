//! Two-phase confirmation for destructive or outward-facing actions.
//!
//! A caller first asks for a [`ConfirmationToken`] describing the action,
//! shows its prompt to the user, and only then redeems it. Tokens are
//! single-use and stay bound to the action they were issued for.

use crate::error::{Result, VidwikiError};
use crate::sink::SinkTarget;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

/// An action that needs explicit confirmation before it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmableAction {
    /// Irreversibly delete a session.
    DeleteSession { session_id: String },
    /// Publish a session's document to external sinks.
    SaveToSinks {
        session_id: String,
        targets: Vec<SinkTarget>,
    },
}

impl ConfirmableAction {
    /// Human-readable question to present before executing.
    pub fn prompt(&self) -> String {
        match self {
            Self::DeleteSession { session_id } => {
                format!("Delete session '{session_id}'? This cannot be undone.")
            }
            Self::SaveToSinks {
                session_id,
                targets,
            } => {
                let names: Vec<String> = targets.iter().map(ToString::to_string).collect();
                format!(
                    "Save session '{session_id}' to {}? The document leaves this machine.",
                    names.join(", ")
                )
            }
        }
    }
}

/// Proof that a specific action was presented for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationToken {
    id: String,
    action: ConfirmableAction,
}

impl ConfirmationToken {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn action(&self) -> &ConfirmableAction {
        &self.action
    }

    pub fn prompt(&self) -> String {
        self.action.prompt()
    }
}

/// Issues and redeems confirmation tokens.
#[derive(Debug, Default)]
pub struct ConfirmationGate {
    pending: Mutex<HashMap<String, ConfirmableAction>>,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action and returns the token that authorizes it.
    pub fn request_confirmation(&self, action: ConfirmableAction) -> ConfirmationToken {
        let id = Uuid::new_v4().to_string();
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), action.clone());
        tracing::debug!("[Confirmation] issued token {} for {:?}", id, action);
        ConfirmationToken { id, action }
    }

    /// Consumes a token and returns the action it authorizes.
    ///
    /// Fails if the token is unknown, was already redeemed or cancelled, or
    /// its action differs from the one registered under its id.
    pub fn redeem(&self, token: &ConfirmationToken) -> Result<ConfirmableAction> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);

        match pending.get(&token.id) {
            None => Err(VidwikiError::Confirmation(format!(
                "token '{}' is unknown or already used",
                token.id
            ))),
            Some(action) if *action != token.action => Err(VidwikiError::Confirmation(format!(
                "token '{}' does not authorize this action",
                token.id
            ))),
            Some(_) => Ok(pending
                .remove(&token.id)
                .unwrap_or_else(|| token.action.clone())),
        }
    }

    /// Drops a token without executing its action.
    pub fn cancel(&self, token: &ConfirmationToken) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&token.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delete(id: &str) -> ConfirmableAction {
        ConfirmableAction::DeleteSession {
            session_id: id.to_string(),
        }
    }

    #[test]
    fn test_token_is_single_use() {
        let gate = ConfirmationGate::new();
        let token = gate.request_confirmation(delete("s1"));

        assert_eq!(gate.redeem(&token).unwrap(), delete("s1"));
        assert!(matches!(
            gate.redeem(&token),
            Err(VidwikiError::Confirmation(_))
        ));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let gate = ConfirmationGate::new();
        let token = gate.request_confirmation(delete("s1"));
        let forged = ConfirmationToken {
            id: token.id().to_string(),
            action: delete("s2"),
        };

        assert!(gate.redeem(&forged).is_err());
        assert!(gate.redeem(&token).is_ok());
    }

    #[test]
    fn test_cancelled_token_cannot_be_redeemed() {
        let gate = ConfirmationGate::new();
        let token = gate.request_confirmation(delete("s1"));
        gate.cancel(&token);
        assert!(gate.redeem(&token).is_err());
    }

    #[test]
    fn test_prompt_names_targets() {
        let action = ConfirmableAction::SaveToSinks {
            session_id: "s1".to_string(),
            targets: vec![SinkTarget::Drive, SinkTarget::Sheet],
        };
        assert!(action.prompt().contains("drive, sheet"));
    }
}
