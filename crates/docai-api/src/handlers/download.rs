use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use docai_core::constants::{converted_filename, PDF_CONTENT_TYPE};
use docai_core::{AppError, Bucket, FileId};
use docai_storage::{BlobStore, LocalBlobStore, RemoteBlobStore, StorageBackend, StorageError};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

#[utoipa::path(
    get,
    path = "/download/{file_id}",
    tag = "documents",
    params(
        ("file_id" = String, Path, description = "Identifier returned by the upload endpoint")
    ),
    responses(
        (status = 200, description = "Converted document (local storage)", content_type = "application/pdf"),
        (status = 307, description = "Redirect to a signed URL (remote storage)"),
        (status = 404, description = "Processing or not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, method), fields(method = %method))]
pub async fn download_document(
    State(state): State<Arc<AppState>>,
    method: Method,
    Path(file_id): Path<String>,
) -> Result<Response, HttpAppError> {
    let file_id = FileId::parse(&file_id).ok_or_else(HttpAppError::processing_or_not_found)?;
    let head_only = method == Method::HEAD;

    match &state.storage {
        StorageBackend::Local(store) => serve_local(store, &file_id, head_only).await,
        StorageBackend::Remote(store) => {
            redirect_remote(store, &file_id, state.config.signed_url_expiry()).await
        }
    }
}

async fn serve_local(
    store: &LocalBlobStore,
    file_id: &FileId,
    head_only: bool,
) -> Result<Response, HttpAppError> {
    let path = match store.resolve_path(file_id, Bucket::Output).await {
        Ok(path) => path,
        Err(StorageError::NotFound(_)) => return Err(HttpAppError::processing_or_not_found()),
        Err(e) => return Err(e.into()),
    };

    // The file can disappear between resolve and open (cleanup); same 404 then.
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(HttpAppError::processing_or_not_found())
        }
        Err(e) => return Err(StorageError::IoError(e).into()),
    };
    let length = file
        .metadata()
        .await
        .map_err(StorageError::IoError)?
        .len();

    tracing::debug!(file_id = %file_id, size_bytes = length, "Serving converted document");

    let body = if head_only {
        Body::empty()
    } else {
        Body::from_stream(ReaderStream::new(file))
    };

    let content_disposition = format!("attachment; filename=\"{}\"", converted_filename(file_id));

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, PDF_CONTENT_TYPE)
        .header(header::CONTENT_DISPOSITION, content_disposition)
        .header(header::CONTENT_LENGTH, length)
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

async fn redirect_remote(
    store: &RemoteBlobStore,
    file_id: &FileId,
    expires_in: std::time::Duration,
) -> Result<Response, HttpAppError> {
    if !store.exists(file_id, Bucket::Output).await? {
        return Err(HttpAppError::processing_or_not_found());
    }

    let url = store.signed_url(file_id, Bucket::Output, expires_in).await?;
    tracing::debug!(file_id = %file_id, "Redirecting to signed URL");

    Ok(Redirect::temporary(&url).into_response())
}
