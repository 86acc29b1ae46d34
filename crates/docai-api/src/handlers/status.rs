use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use docai_core::models::StatusResponse;
use docai_core::{AppError, Bucket, ConversionStatus, FileId};
use docai_storage::BlobStore;
use std::sync::Arc;

/// Conversion status for an upload.
///
/// An existing output blob always reports `completed`, which also covers
/// uploads from before a restart. Otherwise the in-process job record decides,
/// so failed conversions are visible here even though `/download` keeps
/// answering 404 for them.
#[utoipa::path(
    get,
    path = "/status/{file_id}",
    tag = "documents",
    params(
        ("file_id" = String, Path, description = "Identifier returned by the upload endpoint")
    ),
    responses(
        (status = 200, description = "Current conversion status", body = StatusResponse),
        (status = 404, description = "Unknown identifier", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn conversion_status(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Json<StatusResponse>, HttpAppError> {
    let not_found = || HttpAppError(AppError::NotFound(format!("Unknown file id: {}", file_id)));
    let id = FileId::parse(&file_id).ok_or_else(not_found)?;

    if state
        .storage
        .blob_store()
        .exists(&id, Bucket::Output)
        .await?
    {
        return Ok(Json(StatusResponse {
            file_id: id,
            status: ConversionStatus::Completed,
            error: None,
        }));
    }

    let record = state
        .conversion
        .tracker
        .get(&id)
        .await
        .ok_or_else(not_found)?;

    Ok(Json(StatusResponse {
        file_id: id,
        status: record.status,
        error: record.error,
    }))
}
