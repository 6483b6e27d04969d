use super::{DRIVE_UPLOAD_API, GoogleAuth, bearer, read_json, request_failed};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use vidwiki_core::Result;
use vidwiki_core::sink::{ExternalSink, SinkDocument, SinkReadiness, SinkReceipt, SinkTarget};

const BOUNDARY: &str = "vidwiki-upload-boundary";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedFile {
    id: String,
    web_view_link: Option<String>,
}

/// Uploads each article as a plain-text file to Google Drive.
pub struct GoogleDriveSink {
    client: Client,
    auth: GoogleAuth,
    folder_id: Option<String>,
}

impl GoogleDriveSink {
    pub fn new(auth: GoogleAuth, folder_id: Option<String>) -> Self {
        Self {
            client: Client::new(),
            auth,
            folder_id: folder_id.filter(|f| !f.trim().is_empty()),
        }
    }

    fn metadata(&self, document: &SinkDocument) -> serde_json::Value {
        let mut metadata = serde_json::json!({
            "name": document.filename(),
            "mimeType": "text/plain",
        });
        if let Some(folder) = &self.folder_id {
            metadata["parents"] = serde_json::json!([folder]);
        }
        metadata
    }
}

/// Builds a `multipart/related` body: JSON metadata, then the file content.
fn multipart_related_body(metadata: &serde_json::Value, content: &str) -> String {
    format!(
        "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{meta}\r\n\
         --{b}\r\nContent-Type: text/plain; charset=UTF-8\r\n\r\n{content}\r\n\
         --{b}--\r\n",
        b = BOUNDARY,
        meta = metadata,
        content = content,
    )
}

#[async_trait]
impl ExternalSink for GoogleDriveSink {
    fn target(&self) -> SinkTarget {
        SinkTarget::Drive
    }

    async fn check_ready(&self) -> SinkReadiness {
        self.auth.readiness()
    }

    async fn write(&self, document: &SinkDocument) -> Result<SinkReceipt> {
        let token = bearer(SinkTarget::Drive, &self.auth)?;
        let body = multipart_related_body(&self.metadata(document), &document.content);

        let response = self
            .client
            .post(format!(
                "{}/files?uploadType=multipart&fields=id,webViewLink",
                DRIVE_UPLOAD_API
            ))
            .bearer_auth(token)
            .header(
                "content-type",
                format!("multipart/related; boundary={}", BOUNDARY),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| request_failed(SinkTarget::Drive, e))?;

        let file: UploadedFile = read_json(SinkTarget::Drive, response).await?;
        tracing::info!("[GoogleDriveSink] uploaded {} as {}", document.filename(), file.id);

        Ok(SinkReceipt {
            link: Some(
                file.web_view_link
                    .unwrap_or_else(|| format!("https://drive.google.com/file/d/{}/view", file.id)),
            ),
        })
    }
}
