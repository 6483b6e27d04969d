//! Persistence targets and per-target outcomes.
//!
//! A save writes one canonical document to several destinations. The
//! session's own store (`Library`) is always written first; `Drive` and
//! `Sheet` are external sinks that can be unconfigured or fail on their own.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A save destination, in the order saves attempt them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SinkTarget {
    /// The session store.
    Library,
    /// A Drive-like file store.
    Drive,
    /// A spreadsheet collecting one row per saved article.
    Sheet,
}

/// Whether a sink can accept writes right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkReadiness {
    pub ready: bool,
    /// Why the sink is not ready; empty when ready.
    pub reason: String,
}

impl SinkReadiness {
    pub fn ready() -> Self {
        Self {
            ready: true,
            reason: String::new(),
        }
    }

    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self {
            ready: false,
            reason: reason.into(),
        }
    }
}

/// Everything an external sink needs to store one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkDocument {
    pub session_id: String,
    pub title: String,
    pub source_reference: Option<String>,
    /// Canonical document (body + tags).
    pub content: String,
    /// RFC 3339 time of the save.
    pub saved_at: String,
}

impl SinkDocument {
    /// File name used by file-store sinks.
    pub fn filename(&self) -> String {
        if self.session_id.trim().is_empty() {
            "wiki_article.txt".to_string()
        } else {
            format!("{}.txt", self.session_id)
        }
    }
}

/// What a sink reports back after a successful write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkReceipt {
    /// Link to the stored artifact, when the sink provides one.
    pub link: Option<String>,
}

/// An external persistence destination.
#[async_trait]
pub trait ExternalSink: Send + Sync {
    /// The target this sink serves.
    fn target(&self) -> SinkTarget;

    /// Verifies credentials and configuration without writing anything.
    async fn check_ready(&self) -> SinkReadiness;

    /// Stores the document. Only called after `check_ready` reported ready.
    async fn write(&self, document: &SinkDocument) -> Result<SinkReceipt>;
}

/// Result status of one target within one save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SinkStatus {
    Success,
    Failure,
}

/// Why a target failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SinkFailure {
    /// Preconditions unmet; no write was attempted.
    NotReady,
    /// The write itself failed.
    WriteFailed,
}

/// The outcome of one target within one save attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceOutcome {
    pub sink: SinkTarget,
    pub status: SinkStatus,
    /// Link on success, actionable message on failure.
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<SinkFailure>,
}

impl PersistenceOutcome {
    pub fn success(sink: SinkTarget, detail: impl Into<String>) -> Self {
        Self {
            sink,
            status: SinkStatus::Success,
            detail: detail.into(),
            failure: None,
        }
    }

    pub fn not_ready(sink: SinkTarget, reason: impl Into<String>) -> Self {
        Self {
            sink,
            status: SinkStatus::Failure,
            detail: format!("not configured: {}", reason.into()),
            failure: Some(SinkFailure::NotReady),
        }
    }

    pub fn write_failed(sink: SinkTarget, message: impl Into<String>) -> Self {
        Self {
            sink,
            status: SinkStatus::Failure,
            detail: message.into(),
            failure: Some(SinkFailure::WriteFailed),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SinkStatus::Success
    }
}
