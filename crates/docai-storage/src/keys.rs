//! Shared key generation for storage backends.
//!
//! Local: `{root}/{bucket}/{file_id}.pdf`. Remote: object key `{bucket}/{file_id}.pdf`.

use docai_core::constants::PDF_EXTENSION;
use docai_core::{Bucket, FileId};

/// File name of a blob inside its bucket.
pub fn blob_filename(file_id: &FileId) -> String {
    format!("{}.{}", file_id, PDF_EXTENSION)
}

/// Object key of a blob in a flat object store.
pub fn object_key(file_id: &FileId, bucket: Bucket) -> String {
    format!("{}/{}", bucket.as_str(), blob_filename(file_id))
}
