//! Google Drive and Sheets sinks.
//!
//! Both sinks share one authorized-user token. Obtaining that token (the
//! OAuth consent flow) happens outside vidwiki; the sinks only read it.

mod drive_sink;
mod sheet_sink;

pub use drive_sink::GoogleDriveSink;
pub use sheet_sink::GoogleSheetSink;

use crate::paths::VidwikiPaths;
use reqwest::Response;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vidwiki_core::config::{AppConfig, DriveSettings};
use vidwiki_core::sink::{ExternalSink, SinkReadiness, SinkTarget};
use vidwiki_core::{Result, VidwikiError};

pub(crate) const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";
pub(crate) const DRIVE_UPLOAD_API: &str = "https://www.googleapis.com/upload/drive/v3";
pub(crate) const SHEETS_API: &str = "https://sheets.googleapis.com/v4";

/// Builds the Drive and Sheet sinks described by the configuration.
pub fn google_sinks(config: &AppConfig, paths: &VidwikiPaths) -> Vec<Arc<dyn ExternalSink>> {
    let auth = GoogleAuth::from_settings(&config.drive, paths);
    vec![
        Arc::new(GoogleDriveSink::new(
            auth.clone(),
            config.drive.folder_id.clone(),
        )),
        Arc::new(GoogleSheetSink::new(
            auth,
            config.sheet.spreadsheet_id.clone(),
            config.sheet.spreadsheet_name.clone(),
        )),
    ]
}

/// Token file written by Google's installed-app flow (`token.json`).
#[derive(Debug, Deserialize)]
struct AuthorizedUserToken {
    #[serde(alias = "access_token")]
    token: Option<String>,
    expiry: Option<String>,
}

/// Locates the OAuth client secrets and the issued user token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleAuth {
    credentials_path: PathBuf,
    token_path: PathBuf,
}

impl GoogleAuth {
    pub fn new(credentials_path: impl Into<PathBuf>, token_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            token_path: token_path.into(),
        }
    }

    /// Uses the paths from `[drive]`, defaulting to the `google/` directory.
    pub fn from_settings(settings: &DriveSettings, paths: &VidwikiPaths) -> Self {
        Self::new(
            settings
                .credentials_path
                .clone()
                .unwrap_or_else(|| paths.google_credentials_file()),
            settings
                .token_path
                .clone()
                .unwrap_or_else(|| paths.google_token_file()),
        )
    }

    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    /// Ready when the client secrets exist and an unexpired token is present.
    pub fn readiness(&self) -> SinkReadiness {
        if !self.credentials_path.is_file() {
            return SinkReadiness::not_ready(format!(
                "missing OAuth client file {}",
                self.credentials_path.display()
            ));
        }
        match self.access_token() {
            Ok(_) => SinkReadiness::ready(),
            Err(reason) => SinkReadiness::not_ready(reason),
        }
    }

    /// Reads the access token, explaining what is wrong when unusable.
    pub fn access_token(&self) -> std::result::Result<String, String> {
        let raw = fs::read_to_string(&self.token_path).map_err(|_| {
            format!(
                "no authorized token at {}; complete Google authorization first",
                self.token_path.display()
            )
        })?;
        let token: AuthorizedUserToken = serde_json::from_str(&raw)
            .map_err(|e| format!("unreadable token {}: {}", self.token_path.display(), e))?;

        if let Some(expiry) = token.expiry.as_deref() {
            if let Ok(expiry) = chrono::DateTime::parse_from_rfc3339(expiry) {
                if expiry < chrono::Utc::now() {
                    return Err(format!("access token expired at {}; re-authorize", expiry));
                }
            }
        }

        token
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| format!("token file {} holds no access token", self.token_path.display()))
    }
}

#[derive(Deserialize)]
struct GoogleErrorResponse {
    error: GoogleErrorBody,
}

#[derive(Deserialize)]
struct GoogleErrorBody {
    message: String,
}

/// Maps a request failure to a write error for `sink`.
pub(crate) fn request_failed(sink: SinkTarget, err: reqwest::Error) -> VidwikiError {
    VidwikiError::sink_write(sink.to_string(), format!("request failed: {}", err))
}

/// Decodes a JSON response, turning non-2xx statuses into write errors.
pub(crate) async fn read_json<T: DeserializeOwned>(
    sink: SinkTarget,
    response: Response,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        let message = serde_json::from_str::<GoogleErrorResponse>(&body)
            .map(|wrapper| wrapper.error.message)
            .unwrap_or(body);
        return Err(VidwikiError::sink_write(
            sink.to_string(),
            format!("HTTP {}: {}", status.as_u16(), message),
        ));
    }
    response.json::<T>().await.map_err(|e| {
        VidwikiError::sink_write(sink.to_string(), format!("unexpected response: {}", e))
    })
}

/// Fetches the bearer token for a write that already passed readiness.
pub(crate) fn bearer(sink: SinkTarget, auth: &GoogleAuth) -> Result<String> {
    auth.access_token()
        .map_err(|reason| VidwikiError::sink_not_ready(sink.to_string(), reason))
}
