//! Session repository trait.
//!
//! Defines the interface for session persistence operations.

use super::model::Session;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for managing session persistence.
///
/// This trait decouples the workflow controller from the specific storage
/// mechanism (TOML files, a database, a remote API).
///
/// Creating and updating a session are both expressed as [`save`](Self::save);
/// the application layer decides which fields change.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Saves a session to storage, replacing any previous version.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Deletes a session from storage.
    ///
    /// Deleting a session that does not exist is not an error.
    async fn delete(&self, session_id: &str) -> Result<()>;

    /// Lists all stored sessions, most recently created first.
    async fn list_all(&self) -> Result<Vec<Session>>;
}
