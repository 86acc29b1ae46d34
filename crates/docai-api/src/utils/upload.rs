//! Multipart extraction and validation for the upload handler.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use docai_core::constants::PDF_CONTENT_TYPE;
use docai_core::AppError;

/// Name of the multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

pub struct UploadedFile {
    pub data: Bytes,
    pub filename: Option<String>,
    pub content_type: String,
}

fn multipart_error(err: MultipartError, max_size: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return payload_too_large(max_size);
    }
    AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
}

fn payload_too_large(max_size: usize) -> AppError {
    AppError::PayloadTooLarge(format!(
        "File size exceeds maximum allowed size of {} bytes",
        max_size
    ))
}

/// Extract the `file` field from a multipart form.
///
/// The declared content type is checked before any of the field's bytes are
/// read; the body is then buffered up to `max_size` bytes.
pub async fn extract_pdf_upload(
    mut multipart: Multipart,
    max_size: usize,
) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        validate_content_type(&content_type)?;

        let filename = field.file_name().map(str::to_string);
        let data = read_field(field, max_size).await?;

        return Ok(UploadedFile {
            data,
            filename,
            content_type,
        });
    }

    Err(AppError::InvalidInput(format!(
        "No file provided; send a multipart field named '{}'",
        FILE_FIELD
    )))
}

async fn read_field(mut field: Field<'_>, max_size: usize) -> Result<Bytes, AppError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        validate_file_size(buf.len() + chunk.len(), max_size)?;
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

/// Only `application/pdf`, compared verbatim. Parameters or different casing are rejected.
pub fn validate_content_type(content_type: &str) -> Result<(), AppError> {
    if content_type != PDF_CONTENT_TYPE {
        return Err(AppError::UnsupportedMediaType(format!(
            "Only PDF files are supported, got '{}'",
            content_type
        )));
    }
    Ok(())
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(payload_too_large(max_size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_must_match_exactly() {
        assert!(validate_content_type("application/pdf").is_ok());
        assert!(matches!(
            validate_content_type("image/png"),
            Err(AppError::UnsupportedMediaType(_))
        ));
        assert!(validate_content_type("application/PDF").is_err());
        assert!(validate_content_type("application/pdf; charset=binary").is_err());
        assert!(validate_content_type("").is_err());
    }

    #[test]
    fn test_file_size_limit_is_inclusive() {
        assert!(validate_file_size(100, 100).is_ok());
        assert!(matches!(
            validate_file_size(101, 100),
            Err(AppError::PayloadTooLarge(_))
        ));
    }
}
