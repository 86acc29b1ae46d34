use crate::keys::object_key;
use crate::traits::{BlobStore, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use docai_core::{Bucket, FileId, StorageKind};
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{DynObjectStore, ObjectStoreExt, PutPayload};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// S3 blob store.
///
/// Object keys are `{bucket}/{file_id}.pdf` inside a single S3 bucket. Downloads
/// are served by redirecting clients to a presigned GET URL.
#[derive(Clone)]
pub struct RemoteBlobStore {
    store: Arc<DynObjectStore>,
    signer: AmazonS3,
    bucket_name: String,
}

impl RemoteBlobStore {
    /// Connect to `bucket_name` in `region`.
    ///
    /// Credentials come from the standard AWS environment variables. `endpoint_url`
    /// targets S3-compatible providers (e.g. "http://localhost:9000" for MinIO).
    pub async fn new(
        bucket_name: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket_name.clone());

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        let s3 = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::from_parts(Arc::new(s3.clone()), s3, bucket_name))
    }

    /// Assemble a store from an arbitrary object store plus the S3 client used to
    /// presign URLs. Used with in-memory stores in tests.
    pub fn from_parts(store: Arc<DynObjectStore>, signer: AmazonS3, bucket_name: String) -> Self {
        RemoteBlobStore {
            store,
            signer,
            bucket_name,
        }
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    /// Presigned GET URL for a blob, valid for `expires_in`.
    pub async fn signed_url(
        &self,
        file_id: &FileId,
        bucket: Bucket,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let location = Path::from(object_key(file_id, bucket));

        let url = self
            .signer
            .signed_url(Method::GET, &location, expires_in)
            .await
            .map_err(|e| StorageError::BackendError(format!("Failed to sign URL: {}", e)))?;

        Ok(url.to_string())
    }

    fn map_error(err: ObjectStoreError, key: &str, fallback: fn(String) -> StorageError) -> StorageError {
        match err {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => fallback(other.to_string()),
        }
    }
}

#[async_trait]
impl BlobStore for RemoteBlobStore {
    async fn save(&self, file_id: &FileId, bucket: Bucket, data: Bytes) -> StorageResult<()> {
        let key = object_key(file_id, bucket);
        let location = Path::from(key.clone());
        let size = data.len();
        let start = Instant::now();

        self.store
            .put(&location, PutPayload::from(data))
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket_name,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket_name,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn load(&self, file_id: &FileId, bucket: Bucket) -> StorageResult<Bytes> {
        let key = object_key(file_id, bucket);
        let location = Path::from(key.clone());

        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| Self::map_error(e, &key, StorageError::DownloadFailed))?;

        result
            .bytes()
            .await
            .map_err(|e| Self::map_error(e, &key, StorageError::DownloadFailed))
    }

    async fn exists(&self, file_id: &FileId, bucket: Bucket) -> StorageResult<bool> {
        match self.content_length(file_id, bucket).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn content_length(&self, file_id: &FileId, bucket: Bucket) -> StorageResult<u64> {
        let key = object_key(file_id, bucket);
        let location = Path::from(key.clone());

        let meta = self
            .store
            .head(&location)
            .await
            .map_err(|e| Self::map_error(e, &key, StorageError::BackendError))?;

        Ok(meta.size)
    }

    async fn delete(&self, file_id: &FileId, bucket: Bucket) -> StorageResult<()> {
        let key = object_key(file_id, bucket);
        let location = Path::from(key.clone());

        match self.store.delete(&location).await {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {
                tracing::info!(bucket = %self.bucket_name, key = %key, "S3 delete successful");
                Ok(())
            }
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }

    fn kind(&self) -> StorageKind {
        StorageKind::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn offline_signer() -> AmazonS3 {
        AmazonS3Builder::new()
            .with_bucket_name("docai-test")
            .with_region("us-east-1")
            .with_access_key_id("AKIDEXAMPLE")
            .with_secret_access_key("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY")
            .build()
            .unwrap()
    }

    fn memory_store() -> RemoteBlobStore {
        RemoteBlobStore::from_parts(
            Arc::new(InMemory::new()),
            offline_signer(),
            "docai-test".to_string(),
        )
    }

    #[tokio::test]
    async fn test_save_exists_load_delete() {
        let store = memory_store();
        let id = FileId::new();

        assert!(!store.exists(&id, Bucket::Output).await.unwrap());

        store
            .save(&id, Bucket::Output, Bytes::from_static(b"%PDF-converted"))
            .await
            .unwrap();

        assert!(store.exists(&id, Bucket::Output).await.unwrap());
        assert!(!store.exists(&id, Bucket::Input).await.unwrap());
        assert_eq!(store.content_length(&id, Bucket::Output).await.unwrap(), 14);
        assert_eq!(
            store.load(&id, Bucket::Output).await.unwrap(),
            Bytes::from_static(b"%PDF-converted")
        );

        store.delete(&id, Bucket::Output).await.unwrap();
        assert!(!store.exists(&id, Bucket::Output).await.unwrap());
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let store = memory_store();
        let err = store.load(&FileId::new(), Bucket::Input).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_signed_url_targets_object_key() {
        let store = memory_store();
        let id = FileId::new();

        let url = store
            .signed_url(&id, Bucket::Output, Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(url.contains(&format!("output/{}.pdf", id)));
        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains("X-Amz-Expires=3600"));
    }
}
