//! Session application services.
//!
//! Lifecycle management (create, load, list, delete) and the
//! find-update-save helper used by saves.

mod manager;
mod updater;

pub use manager::SessionLifecycleManager;
pub use updater::SessionUpdater;
