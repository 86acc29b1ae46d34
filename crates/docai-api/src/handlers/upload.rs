use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_pdf_upload;
use axum::{
    extract::{Multipart, State},
    Json,
};
use docai_core::models::UploadResponse;
use docai_core::{AppError, Bucket, FileId};
use docai_storage::BlobStore;
use std::sync::Arc;
use utoipa::ToSchema;

/// Multipart form accepted by `POST /upload` (documentation only).
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// PDF document; the part must declare `Content-Type: application/pdf`.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "documents",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document stored and conversion scheduled", body = UploadResponse),
        (status = 400, description = "Not a PDF or malformed form", body = ErrorResponse),
        (status = 413, description = "Document exceeds the upload limit", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(file_id = tracing::field::Empty))]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let upload = extract_pdf_upload(multipart, state.config.max_upload_size_bytes).await?;

    let file_id = FileId::new();
    tracing::Span::current().record("file_id", tracing::field::display(&file_id));

    let size = upload.data.len();
    state
        .storage
        .blob_store()
        .save(&file_id, Bucket::Input, upload.data)
        .await?;

    tracing::info!(
        file_id = %file_id,
        filename = ?upload.filename,
        content_type = %upload.content_type,
        size_bytes = size,
        "Document uploaded"
    );

    if let Err(e) = state.conversion.queue.submit(file_id).await {
        // The input has no job behind it.
        if let Err(delete_err) = state
            .storage
            .blob_store()
            .delete(&file_id, Bucket::Input)
            .await
        {
            tracing::warn!(
                file_id = %file_id,
                error = %delete_err,
                "Failed to remove input of unscheduled conversion"
            );
        }
        return Err(AppError::Conversion(format!("{:#}", e)).into());
    }

    Ok(Json(UploadResponse::processing(file_id)))
}
