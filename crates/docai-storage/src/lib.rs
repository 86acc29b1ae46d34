//! DocAI Storage Library
//!
//! Blob storage for uploaded and converted documents. Blobs are addressed by
//! `(FileId, Bucket)`; the two buckets are `input` and `output`.
//!
//! Two backends exist and are selected once at startup through
//! [`StorageBackend`]:
//!
//! - [`LocalBlobStore`] keeps blobs on disk and can resolve a blob to a path, so
//!   the API streams files itself and the cleanup task can sweep old files.
//! - [`RemoteBlobStore`] keeps blobs in S3 and issues signed URLs, so the API
//!   redirects instead of proxying bytes.

pub mod factory;
pub(crate) mod keys;
pub mod local;
pub mod remote;
pub mod traits;

// Re-export commonly used types
pub use docai_core::StorageKind;
pub use factory::{create_storage, StorageBackend};
pub use local::{LocalBlobStore, SweepReport};
pub use remote::RemoteBlobStore;
pub use traits::{BlobStore, StorageError, StorageResult};
