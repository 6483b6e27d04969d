use super::{DRIVE_API, GoogleAuth, SHEETS_API, bearer, read_json, request_failed};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use vidwiki_core::Result;
use vidwiki_core::sink::{ExternalSink, SinkDocument, SinkReadiness, SinkReceipt, SinkTarget};

/// Header row written when the spreadsheet is created.
pub const SHEET_HEADER: [&str; 4] = ["URL YouTube", "Tiêu đề", "Thời gian tạo", "Nội dung SEO"];

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSpreadsheet {
    spreadsheet_id: String,
    spreadsheet_url: Option<String>,
}

#[derive(Deserialize)]
struct Ignored {}

/// Appends one row per saved article to a Google spreadsheet.
///
/// The spreadsheet is taken from configuration when an id is set, otherwise
/// found by name and created (with a header row) when missing.
pub struct GoogleSheetSink {
    client: Client,
    auth: GoogleAuth,
    spreadsheet_id: Option<String>,
    spreadsheet_name: String,
}

impl GoogleSheetSink {
    pub fn new(
        auth: GoogleAuth,
        spreadsheet_id: Option<String>,
        spreadsheet_name: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            auth,
            spreadsheet_id: spreadsheet_id.filter(|id| !id.trim().is_empty()),
            spreadsheet_name: spreadsheet_name.into(),
        }
    }

    /// Returns `(spreadsheet_id, url)`.
    async fn resolve_spreadsheet(&self, token: &str) -> Result<(String, String)> {
        if let Some(id) = &self.spreadsheet_id {
            return Ok((id.clone(), spreadsheet_url(id)));
        }

        let response = self
            .client
            .get(format!("{}/files", DRIVE_API))
            .bearer_auth(token)
            .query(&[
                ("q", spreadsheet_query(&self.spreadsheet_name)),
                ("fields", "files(id)".to_string()),
            ])
            .send()
            .await
            .map_err(|e| request_failed(SinkTarget::Sheet, e))?;
        let found: FileList = read_json(SinkTarget::Sheet, response).await?;

        if let Some(file) = found.files.into_iter().next() {
            let url = spreadsheet_url(&file.id);
            return Ok((file.id, url));
        }

        self.create_spreadsheet(token).await
    }

    async fn create_spreadsheet(&self, token: &str) -> Result<(String, String)> {
        let response = self
            .client
            .post(format!("{}/spreadsheets", SHEETS_API))
            .bearer_auth(token)
            .json(&serde_json::json!({ "properties": { "title": self.spreadsheet_name } }))
            .send()
            .await
            .map_err(|e| request_failed(SinkTarget::Sheet, e))?;
        let created: CreatedSpreadsheet = read_json(SinkTarget::Sheet, response).await?;
        tracing::info!(
            "[GoogleSheetSink] created spreadsheet '{}' ({})",
            self.spreadsheet_name,
            created.spreadsheet_id
        );

        let response = self
            .client
            .put(format!(
                "{}/spreadsheets/{}/values/A1",
                SHEETS_API, created.spreadsheet_id
            ))
            .bearer_auth(token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&serde_json::json!({ "values": [SHEET_HEADER] }))
            .send()
            .await
            .map_err(|e| request_failed(SinkTarget::Sheet, e))?;
        let _: Ignored = read_json(SinkTarget::Sheet, response).await?;

        let url = created
            .spreadsheet_url
            .unwrap_or_else(|| spreadsheet_url(&created.spreadsheet_id));
        Ok((created.spreadsheet_id, url))
    }
}

fn spreadsheet_url(id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{}/edit", id)
}

fn spreadsheet_query(name: &str) -> String {
    format!(
        "name = '{}' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false",
        name.replace('\\', "\\\\").replace('\'', "\\'")
    )
}

/// `[source URL, title, timestamp, content]`
fn row_for(document: &SinkDocument) -> [String; 4] {
    [
        document.source_reference.clone().unwrap_or_default(),
        document.title.clone(),
        document.saved_at.clone(),
        document.content.clone(),
    ]
}

#[async_trait]
impl ExternalSink for GoogleSheetSink {
    fn target(&self) -> SinkTarget {
        SinkTarget::Sheet
    }

    async fn check_ready(&self) -> SinkReadiness {
        if self.spreadsheet_id.is_none() && self.spreadsheet_name.trim().is_empty() {
            return SinkReadiness::not_ready("neither spreadsheet_id nor spreadsheet_name is set");
        }
        self.auth.readiness()
    }

    async fn write(&self, document: &SinkDocument) -> Result<SinkReceipt> {
        let token = bearer(SinkTarget::Sheet, &self.auth)?;
        let (spreadsheet_id, url) = self.resolve_spreadsheet(&token).await?;

        let response = self
            .client
            .post(format!(
                "{}/spreadsheets/{}/values/A1:append",
                SHEETS_API, spreadsheet_id
            ))
            .bearer_auth(&token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&serde_json::json!({ "values": [row_for(document)] }))
            .send()
            .await
            .map_err(|e| request_failed(SinkTarget::Sheet, e))?;
        let _: Ignored = read_json(SinkTarget::Sheet, response).await?;

        tracing::info!(
            "[GoogleSheetSink] appended session {} to {}",
            document.session_id,
            spreadsheet_id
        );
        Ok(SinkReceipt { link: Some(url) })
    }
}
