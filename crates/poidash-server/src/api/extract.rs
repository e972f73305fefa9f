//! Extraction endpoints.
//!
//! These routes keep the browser-facing contract of the dashboard rather than
//! the `/api/v1` envelope: `{pois}` on success, `{error, details}` for a bad
//! request body, and a bare `{error}` for every downstream failure. Upstream
//! error internals are logged, never returned.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use poidash_core::{validate_image_input, SchemaViolation};
use poidash_vision::{VisionError, VisionProvider};
use serde::Serialize;

use super::AppState;

/// Caller-facing messages for one extraction route.
struct RouteMessages {
    failure: &'static str,
    invalid_json: &'static str,
}

const OPENAI_MESSAGES: RouteMessages = RouteMessages {
    failure: "Failed to process image",
    invalid_json: "Failed to process image",
};

const GEMINI_MESSAGES: RouteMessages = RouteMessages {
    failure: "Failed to process image with Gemini",
    invalid_json: "Invalid JSON response from Gemini",
};

#[derive(Debug, Serialize)]
struct ExtractErrorBody<'a> {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [SchemaViolation]>,
}

pub(super) async fn extract_openai(State(state): State<AppState>, body: Bytes) -> Response {
    run_extraction(state.openai.as_ref(), &body, &OPENAI_MESSAGES).await
}

pub(super) async fn extract_gemini(State(state): State<AppState>, body: Bytes) -> Response {
    run_extraction(state.gemini.as_ref(), &body, &GEMINI_MESSAGES).await
}

async fn run_extraction(
    provider: Option<&Arc<dyn VisionProvider>>,
    body: &[u8],
    messages: &RouteMessages,
) -> Response {
    // An unparseable body is validated as `null` so the caller still gets a
    // details list.
    let value = serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "extraction request body is not JSON");
        serde_json::Value::Null
    });

    let input = match validate_image_input(&value) {
        Ok(input) => input,
        Err(violations) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ExtractErrorBody {
                    error: "Invalid input",
                    details: Some(violations.details()),
                }),
            )
                .into_response();
        }
    };

    let Some(provider) = provider else {
        tracing::error!("vision provider not configured");
        return server_error(messages.failure);
    };

    match provider.extract(&input.image_url).await {
        Ok(result) => {
            tracing::info!(
                provider = provider.name(),
                count = result.pois.len(),
                "extraction succeeded"
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(e) => {
            tracing::error!(provider = provider.name(), error = %e, "extraction failed");
            match e {
                VisionError::InvalidJson(_) => server_error(messages.invalid_json),
                _ => server_error(messages.failure),
            }
        }
    }
}

fn server_error(message: &'static str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ExtractErrorBody {
            error: message,
            details: None,
        }),
    )
        .into_response()
}
