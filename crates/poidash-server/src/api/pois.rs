use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use poidash_core::{validate_upload, Poi};
use poidash_export::{render, ExportFormat};
use poidash_store::{ReviewAction, ReviewOutcome};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ExportQuery {
    format: Option<String>,
}

pub(super) async fn list_pois(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Poi>>>, ApiError> {
    let pois = state
        .store
        .list_pois()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: pois,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn approve_poi(
    state: State<AppState>,
    req_id: Extension<RequestId>,
    id: Path<String>,
) -> Result<Json<ApiResponse<ReviewOutcome>>, ApiError> {
    review(state, req_id, id, ReviewAction::Approve).await
}

pub(super) async fn reject_poi(
    state: State<AppState>,
    req_id: Extension<RequestId>,
    id: Path<String>,
) -> Result<Json<ApiResponse<ReviewOutcome>>, ApiError> {
    review(state, req_id, id, ReviewAction::Reject).await
}

async fn review(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    action: ReviewAction,
) -> Result<Json<ApiResponse<ReviewOutcome>>, ApiError> {
    let outcome = state
        .store
        .review(&id, action)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: outcome,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Renders the current store list as a file download.
pub(super) async fn export_pois(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let Some(raw_format) = query.format else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "missing required query parameter: format (xlsx, csv or json)",
        ));
    };
    let format: ExportFormat = raw_format
        .parse()
        .map_err(|e: poidash_export::ExportError| {
            ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
        })?;

    let pois = state
        .store
        .list_pois()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    let artifact = render(format, &pois, Utc::now(), &state.export_source).map_err(|e| {
        tracing::error!(%format, error = %e, "export rendering failed");
        ApiError::new(req_id.0.clone(), "internal_error", "export failed")
    })?;

    tracing::info!(%format, records = artifact.records, filename = %artifact.filename, "export served");

    let headers = [
        (header::CONTENT_TYPE, artifact.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.filename),
        ),
    ];
    Ok((headers, artifact.bytes).into_response())
}

/// Forwards an operator photo to the store's extraction upload.
///
/// Expects multipart fields `file`, `latitude` and `longitude`.
pub(super) async fn upload_photo(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let bad_request = |message: String| ApiError::new(req_id.0.clone(), "validation_error", message);
    let mut multipart = multipart.map_err(|e| bad_request(e.body_text()))?;

    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut latitude = String::new();
    let mut longitude = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;
                file = Some((filename, content_type, bytes.to_vec()));
            }
            "latitude" => latitude = field.text().await.map_err(|e| bad_request(e.body_text()))?,
            "longitude" => longitude = field.text().await.map_err(|e| bad_request(e.body_text()))?,
            _ => {}
        }
    }

    let Some((filename, content_type, bytes)) = file else {
        return Err(bad_request("missing multipart field: file".to_string()));
    };
    let form = validate_upload(&filename, content_type.as_deref(), bytes, &latitude, &longitude)
        .map_err(|e| bad_request(e.to_string()))?;

    let reply = state
        .store
        .upload(form)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: reply,
        meta: ResponseMeta::new(req_id.0),
    }))
}
