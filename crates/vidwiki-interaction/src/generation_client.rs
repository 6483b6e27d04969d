//! RemoteGenerationBackend - REST client for the article generation service.
//!
//! The service ingests a source (it fetches the transcript itself) and then
//! writes an SEO article for a session from a free-form prompt.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vidwiki_core::config::GenerationSettings;
use vidwiki_core::error::GenerationStage;
use vidwiki_core::generation::GenerationBackend;
use vidwiki_core::session::SourceKind;
use vidwiki_core::{Result, VidwikiError};

/// [`GenerationBackend`] backed by the generation service's HTTP API.
#[derive(Clone)]
pub struct RemoteGenerationBackend {
    client: Client,
    base_url: String,
}

impl RemoteGenerationBackend {
    /// Creates a client for the service at `base_url`.
    ///
    /// `timeout` bounds every request, generation included, so it should be
    /// generous: articles for long videos take minutes.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VidwikiError::config(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &GenerationSettings) -> Result<Self> {
        Self::new(
            settings.base_url.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, T>(&self, stage: GenerationStage, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("[GenerationClient] POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                VidwikiError::generation(
                    stage,
                    format!("request to {} failed: {}", url, err),
                    err.is_connect() || err.is_timeout(),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(map_http_error(stage, status, body_text));
        }

        response.json::<T>().await.map_err(|err| {
            VidwikiError::generation(stage, format!("unexpected response: {}", err), false)
        })
    }
}

#[async_trait]
impl GenerationBackend for RemoteGenerationBackend {
    async fn register_source(
        &self,
        session_id: &str,
        source_reference: &str,
        kind: SourceKind,
    ) -> Result<()> {
        let request = SourceRequest {
            url: source_reference,
            r#type: kind.to_string(),
        };
        let registered: RegisteredSource = self
            .post_json(
                GenerationStage::RegisterSource,
                &format!("/sessions/{}/add-url", session_id),
                &request,
            )
            .await?;

        if registered.status.as_deref() == Some("error") {
            return Err(VidwikiError::generation(
                GenerationStage::RegisterSource,
                format!("the service could not ingest {}", source_reference),
                false,
            ));
        }
        Ok(())
    }

    async fn generate(&self, session_id: &str, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            custom_prompt: Some(prompt),
        };
        let response: GenerateResponse = self
            .post_json(
                GenerationStage::Generate,
                &format!("/sessions/{}/generate-youtube-seo", session_id),
                &request,
            )
            .await?;

        response
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                VidwikiError::generation(
                    GenerationStage::Generate,
                    "the service returned no content",
                    true,
                )
            })
    }

    async fn derive_title(&self, source_reference: &str) -> Result<String> {
        let request = SourceRequest {
            url: source_reference,
            r#type: SourceKind::Youtube.to_string(),
        };
        let response: TitleResponse = self
            .post_json(GenerationStage::DeriveTitle, "/get-youtube-title", &request)
            .await?;

        response
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                VidwikiError::generation(
                    GenerationStage::DeriveTitle,
                    "the service returned no title",
                    false,
                )
            })
    }
}

#[derive(Serialize)]
struct SourceRequest<'a> {
    url: &'a str,
    r#type: String,
}

#[derive(Deserialize)]
struct RegisteredSource {
    status: Option<String>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    custom_prompt: Option<&'a str>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct TitleResponse {
    title: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    detail: serde_json::Value,
}

fn map_http_error(stage: GenerationStage, status: StatusCode, body: String) -> VidwikiError {
    let detail = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|wrapper| match wrapper.detail {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        })
        .unwrap_or(body);

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    VidwikiError::generation(
        stage,
        format!("HTTP {}: {}", status.as_u16(), detail),
        is_retryable,
    )
}
