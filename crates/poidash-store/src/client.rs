//! HTTP client for the POI store REST API.
//!
//! Wraps `reqwest` with typed errors and lenient decoding of the store's
//! record list. Review transitions are sent as explicit `POST` commands and
//! return a [`ReviewOutcome`] the dashboard can apply to its local copy.
//! Operator photos go to `POST /upload/` as multipart forms.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use poidash_core::{Poi, PoiStatus, UploadForm};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::error::StoreError;

/// Characters left unescaped in a path segment (RFC 3986 unreserved set).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    #[must_use]
    pub fn target_status(self) -> PoiStatus {
        match self {
            ReviewAction::Approve => PoiStatus::Approved,
            ReviewAction::Reject => PoiStatus::Rejected,
        }
    }

    fn path(self) -> &'static str {
        match self {
            ReviewAction::Approve => "approve-image",
            ReviewAction::Reject => "reject-image",
        }
    }
}

impl std::fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewAction::Approve => write!(f, "approve"),
            ReviewAction::Reject => write!(f, "reject"),
        }
    }
}

/// Result of a review command.
///
/// `record` holds the store's updated copy when the response body decodes as a
/// POI; otherwise callers patch their local copy with `status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewOutcome {
    pub id: String,
    pub status: PoiStatus,
    pub record: Option<Poi>,
}

/// Client for the remote POI store.
///
/// Use [`PoiStoreClient::new`] with the configured base URL; tests point it
/// at a wiremock server.
#[derive(Debug, Clone)]
pub struct PoiStoreClient {
    client: Client,
    base_url: Url,
}

impl PoiStoreClient {
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`StoreError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so relative joins append to the base path.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| StoreError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Fetches the current POI list (`GET /images`).
    ///
    /// The store returns either a bare array or `{"data": [...]}`. Elements
    /// are decoded one by one; records that are not valid POIs (no id, no
    /// coordinates) are skipped and counted in a warning.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Http`] on network failure.
    /// - [`StoreError::UnexpectedStatus`] on a non-2xx status.
    /// - [`StoreError::Deserialize`] if the body is not JSON or holds no array.
    pub async fn list_pois(&self) -> Result<Vec<Poi>, StoreError> {
        let url = self.endpoint(&["images"]);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| StoreError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        let records = match value {
            serde_json::Value::Object(mut map) if map.contains_key("data") => {
                map.remove("data").unwrap_or_default()
            }
            other => other,
        };
        let records: Vec<serde_json::Value> =
            serde_json::from_value(records).map_err(|e| StoreError::Deserialize {
                context: format!("{url} (record list)"),
                source: e,
            })?;

        let total = records.len();
        let pois: Vec<Poi> = records
            .into_iter()
            .filter_map(|v| serde_json::from_value::<Poi>(v).ok())
            .collect();

        let skipped = total - pois.len();
        if skipped > 0 {
            tracing::warn!(skipped, total, "skipped store records that are not valid POIs");
        }
        tracing::debug!(count = pois.len(), "fetched POI list");

        Ok(pois)
    }

    /// Marks a POI approved (`POST /approve-image/{id}`).
    ///
    /// # Errors
    ///
    /// See [`PoiStoreClient::review`].
    pub async fn approve(&self, id: &str) -> Result<ReviewOutcome, StoreError> {
        self.review(id, ReviewAction::Approve).await
    }

    /// Marks a POI rejected (`POST /reject-image/{id}`).
    ///
    /// # Errors
    ///
    /// See [`PoiStoreClient::review`].
    pub async fn reject(&self, id: &str) -> Result<ReviewOutcome, StoreError> {
        self.review(id, ReviewAction::Reject).await
    }

    /// Sends a review command for one POI.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] on HTTP 404.
    /// - [`StoreError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`StoreError::Http`] on network failure.
    pub async fn review(&self, id: &str, action: ReviewAction) -> Result<ReviewOutcome, StoreError> {
        let url = self.endpoint(&[action.path(), id]);
        let response = self.client.post(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let record = decode_record(&body);
        tracing::info!(
            poi_id = id,
            %action,
            store_record = record.is_some(),
            "review command accepted by store"
        );

        Ok(ReviewOutcome {
            id: id.to_string(),
            status: action.target_status(),
            record,
        })
    }

    /// Uploads a photo for extraction (`POST /upload/`).
    ///
    /// Sends a multipart form with `file`, `latitude` and `longitude` parts
    /// and returns the store's JSON reply.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Http`] on network failure or an unusable MIME type.
    /// - [`StoreError::UnexpectedStatus`] on a non-2xx status.
    /// - [`StoreError::Deserialize`] if the reply is not JSON.
    pub async fn upload(&self, form: UploadForm) -> Result<serde_json::Value, StoreError> {
        let url = self.endpoint(&["upload", ""]);
        let size = form.bytes.len();
        let file = Part::bytes(form.bytes)
            .file_name(form.filename.clone())
            .mime_str(&form.mime_type)?;
        let body = Form::new()
            .part("file", file)
            .text("latitude", form.coordinate.latitude.to_string())
            .text("longitude", form.coordinate.longitude.to_string());

        let response = self.client.post(url.clone()).multipart(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        let reply = serde_json::from_str(&text).map_err(|e| StoreError::Deserialize {
            context: url.to_string(),
            source: e,
        })?;
        tracing::info!(filename = %form.filename, bytes = size, "photo accepted by store");
        Ok(reply)
    }

    /// Builds `{base}/{seg}/{seg}...` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let path = segments
            .iter()
            .map(|s| utf8_percent_encode(s, PATH_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        let mut url = self.base_url.clone();
        let joined = format!("{}{path}", url.path());
        url.set_path(&joined);
        url
    }
}

/// Decodes a review response body into a POI when it carries one, either at
/// the top level or under `"data"`.
fn decode_record(body: &str) -> Option<Poi> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let candidate = match value.get("data") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => value,
    };
    serde_json::from_value(candidate).ok()
}
