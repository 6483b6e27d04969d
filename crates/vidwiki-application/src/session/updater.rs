//! Session updater helper for common update patterns.
//!
//! This module provides `SessionUpdater` which abstracts the common
//! "find → update → save" pattern used when a save writes to the library.

use std::sync::Arc;
use vidwiki_core::session::{Session, SessionRepository};
use vidwiki_core::{Result, VidwikiError};

/// Loads a session, applies a change, refreshes `updated_at` and saves it.
pub struct SessionUpdater {
    repository: Arc<dyn SessionRepository>,
}

impl SessionUpdater {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// Updates a session by applying the given updater function.
    ///
    /// Returns the session as it was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The session doesn't exist
    /// - The updater function returns an error
    /// - Saving to storage fails
    pub async fn update<F>(&self, session_id: &str, updater: F) -> Result<Session>
    where
        F: FnOnce(&mut Session) -> Result<()>,
    {
        let mut session = self
            .repository
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| VidwikiError::not_found("Session", session_id))?;

        updater(&mut session)?;
        session.touch();

        self.repository.save(&session).await?;
        tracing::debug!("[SessionUpdater] saved session {}", session.id);

        Ok(session)
    }
}
