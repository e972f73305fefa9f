//! Free-text provider (`generateContent` with inline image data).

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use poidash_core::{validate_extraction, ExtractionResult};
use reqwest::{header::CONTENT_TYPE, Client, Url};
use serde::Deserialize;
use serde_json::json;

use crate::prompt::FREE_TEXT_PROMPT;
use crate::{resolve_mime_type, strip_code_fences, VisionError, VisionProvider};

const PROVIDER: &str = "gemini";

pub struct GeminiVision {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// An image downloaded for inline upload.
struct InlineImage {
    mime_type: &'static str,
    data: String,
}

impl GeminiVision {
    /// # Errors
    ///
    /// Returns [`VisionError::Http`] if the client cannot be built or
    /// [`VisionError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, VisionError> {
        Url::parse(base_url).map_err(|_| VisionError::InvalidBaseUrl {
            provider: PROVIDER,
            url: base_url.to_string(),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint: format!(
                "{}/v1beta/models/{model}:generateContent",
                base_url.trim_end_matches('/')
            ),
        })
    }

    /// Downloads the image and resolves the MIME type to declare upstream.
    async fn fetch_image(&self, image_url: &Url) -> Result<InlineImage, VisionError> {
        let response = self.client.get(image_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(VisionError::ImageFetch {
                status: status.as_u16(),
            });
        }

        let mime_type = resolve_mime_type(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let bytes = response.bytes().await?;
        tracing::debug!(provider = PROVIDER, mime_type, size = bytes.len(), "fetched image");

        Ok(InlineImage {
            mime_type,
            data: STANDARD.encode(&bytes),
        })
    }
}

fn response_text(body: GenerateResponse) -> Result<String, VisionError> {
    let candidate = body
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| VisionError::MalformedResponse {
            provider: PROVIDER,
            reason: "response has no candidates".to_string(),
        })?;

    Ok(candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .unwrap_or_default())
}

#[async_trait]
impl VisionProvider for GeminiVision {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn extract(&self, image_url: &Url) -> Result<ExtractionResult, VisionError> {
        let image = self.fetch_image(image_url).await?;

        let request = json!({
            "contents": [{
                "parts": [
                    { "text": FREE_TEXT_PROMPT },
                    { "inline_data": { "mime_type": image.mime_type, "data": image.data } }
                ]
            }]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VisionError::UpstreamStatus {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let body: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| VisionError::MalformedResponse {
                    provider: PROVIDER,
                    reason: e.to_string(),
                })?;

        let text = response_text(body)?;
        tracing::info!(provider = PROVIDER, raw = %text, "vision model response");

        let cleaned = strip_code_fences(&text);
        let value: serde_json::Value =
            serde_json::from_str(&cleaned).map_err(VisionError::InvalidJson)?;
        Ok(validate_extraction(&value)?)
    }
}
