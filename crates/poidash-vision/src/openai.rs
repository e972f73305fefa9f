//! Structured-output provider (chat completions with a strict JSON schema).

use std::time::Duration;

use async_trait::async_trait;
use poidash_core::extraction::extraction_json_schema;
use poidash_core::{validate_extraction, ExtractionResult};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::prompt::STRUCTURED_PROMPT;
use crate::{VisionError, VisionProvider};

const PROVIDER: &str = "openai";

pub struct OpenAiVision {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: serde_json::Value,
    response_format: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
    refusal: Option<String>,
}

impl OpenAiVision {
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
            model: model.to_owned(),
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    fn build_request(&self, image_url: &Url) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.model,
            messages: json!([{
                "role": "user",
                "content": [
                    { "type": "text", "text": STRUCTURED_PROMPT },
                    { "type": "image_url", "image_url": { "url": image_url.as_str() } }
                ]
            }]),
            response_format: json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "poi_response",
                    "strict": true,
                    "schema": extraction_json_schema()
                }
            }),
        }
    }
}

#[async_trait]
impl VisionProvider for OpenAiVision {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn extract(&self, image_url: &Url) -> Result<ExtractionResult, VisionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(image_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VisionError::UpstreamStatus {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let body: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| VisionError::MalformedResponse {
                    provider: PROVIDER,
                    reason: e.to_string(),
                })?;

        let message = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| VisionError::MalformedResponse {
                provider: PROVIDER,
                reason: "response has no choices".to_string(),
            })?;

        if let Some(refusal) = message.refusal.as_deref() {
            tracing::warn!(provider = PROVIDER, refusal, "model refused extraction");
        }

        let content = message.content.unwrap_or_default();
        tracing::info!(provider = PROVIDER, raw = %content, "vision model response");

        // Null or empty structured output means "nothing found", not a failure.
        if content.trim().is_empty() {
            return Ok(ExtractionResult::default());
        }

        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(VisionError::InvalidJson)?;
        if value.is_null() {
            return Ok(ExtractionResult::default());
        }
        Ok(validate_extraction(&value)?)
    }
}
