use poidash_core::SchemaViolations;
use thiserror::Error;

/// Errors raised while extracting POIs through a vision provider.
///
/// None of these are shown verbatim to API callers; the server logs them and
/// answers with a short generic message.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned HTTP status {status}")]
    UpstreamStatus { provider: &'static str, status: u16 },

    #[error("image fetch returned HTTP status {status}")]
    ImageFetch { status: u16 },

    #[error("malformed {provider} response: {reason}")]
    MalformedResponse {
        provider: &'static str,
        reason: String,
    },

    #[error("model output is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("model output does not match the POI schema: {0}")]
    Schema(#[from] SchemaViolations),

    #[error("invalid {provider} base URL '{url}'")]
    InvalidBaseUrl { provider: &'static str, url: String },
}
