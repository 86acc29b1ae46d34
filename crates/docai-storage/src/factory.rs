use crate::{BlobStore, LocalBlobStore, RemoteBlobStore, StorageError, StorageResult};
use docai_core::{Config, StorageKind};
use std::sync::Arc;

/// The configured storage backend.
///
/// Both variants implement [`BlobStore`]. The download path matches on the
/// variant to pick between streaming a local file and redirecting to a signed URL.
#[derive(Clone)]
pub enum StorageBackend {
    Local(Arc<LocalBlobStore>),
    Remote(Arc<RemoteBlobStore>),
}

impl StorageBackend {
    pub fn blob_store(&self) -> Arc<dyn BlobStore> {
        match self {
            StorageBackend::Local(store) => store.clone(),
            StorageBackend::Remote(store) => store.clone(),
        }
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            StorageBackend::Local(_) => StorageKind::Local,
            StorageBackend::Remote(_) => StorageKind::S3,
        }
    }

    /// The local store, when files live on this host.
    pub fn as_local(&self) -> Option<&Arc<LocalBlobStore>> {
        match self {
            StorageBackend::Local(store) => Some(store),
            StorageBackend::Remote(_) => None,
        }
    }
}

impl From<LocalBlobStore> for StorageBackend {
    fn from(store: LocalBlobStore) -> Self {
        StorageBackend::Local(Arc::new(store))
    }
}

impl From<RemoteBlobStore> for StorageBackend {
    fn from(store: RemoteBlobStore) -> Self {
        StorageBackend::Remote(Arc::new(store))
    }
}

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<StorageBackend> {
    match config.storage.backend {
        StorageKind::S3 => {
            let bucket = config
                .storage
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let endpoint = config.storage.s3_endpoint.clone();

            let storage = RemoteBlobStore::new(bucket, region, endpoint).await?;
            Ok(storage.into())
        }
        StorageKind::Local => {
            let storage = LocalBlobStore::new(&config.storage.local_storage_path).await?;
            Ok(storage.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_local_storage() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::local(temp_dir.path().to_string_lossy());

        let backend = create_storage(&config).await.unwrap();

        assert_eq!(backend.kind(), StorageKind::Local);
        assert_eq!(backend.blob_store().kind(), StorageKind::Local);
        assert!(backend.as_local().is_some());
        assert!(temp_dir.path().join("input").is_dir());
    }

    #[tokio::test]
    async fn test_create_s3_storage_requires_bucket() {
        let mut config = Config::local("unused");
        config.storage.backend = StorageKind::S3;
        config.storage.s3_region = Some("us-east-1".to_string());

        let err = create_storage(&config).await.err().unwrap();
        assert!(matches!(err, StorageError::ConfigError(_)));
    }
}
