//! Constants shared across crates.

/// The only content type accepted by the upload endpoint. Compared verbatim.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Extension used for blobs in both buckets.
pub const PDF_EXTENSION: &str = "pdf";

/// Default upload cap in MiB.
pub const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 100;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8000;

/// Client-facing message for a missing output blob. Deliberately the same for
/// "still converting" and "unknown identifier".
pub const PROCESSING_OR_NOT_FOUND: &str = "Processing or not found.";

/// Download filename presented to clients for a converted document.
pub fn converted_filename(file_id: &crate::FileId) -> String {
    format!("converted_{}.{}", file_id, PDF_EXTENSION)
}
