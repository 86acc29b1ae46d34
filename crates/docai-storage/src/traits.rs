//! Storage abstraction trait
//!
//! This module defines the operations every blob backend supports. Capabilities
//! that only one backend has (path resolution, signed URLs) live on the concrete
//! types and are reached through [`crate::StorageBackend`].

use async_trait::async_trait;
use bytes::Bytes;
use docai_core::{Bucket, FileId, StorageKind};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Blob store shared by the HTTP layer and the conversion worker.
///
/// Each operation is expected to be atomic at the backend level; callers do no
/// locking of their own.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `data` under `(file_id, bucket)`, replacing any existing blob.
    async fn save(&self, file_id: &FileId, bucket: Bucket, data: Bytes) -> StorageResult<()>;

    /// Read a whole blob. Missing blobs yield [`StorageError::NotFound`].
    async fn load(&self, file_id: &FileId, bucket: Bucket) -> StorageResult<Bytes>;

    /// Check if a blob exists
    async fn exists(&self, file_id: &FileId, bucket: Bucket) -> StorageResult<bool>;

    /// Size in bytes of an existing blob.
    async fn content_length(&self, file_id: &FileId, bucket: Bucket) -> StorageResult<u64>;

    /// Delete a blob. Deleting a missing blob is not an error.
    async fn delete(&self, file_id: &FileId, bucket: Bucket) -> StorageResult<()>;

    /// Get the storage backend type
    fn kind(&self) -> StorageKind;
}
