use crate::keys::blob_filename;
use crate::traits::{BlobStore, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use docai_core::{Bucket, FileId, StorageKind};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem blob store.
///
/// Layout is `{base_path}/{bucket}/{file_id}.pdf`. Both bucket directories are
/// created when the store is opened.
#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    base_path: PathBuf,
}

/// Outcome of one sweep over a bucket directory.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub removed: usize,
    pub failed: usize,
}

impl SweepReport {
    fn merge(&mut self, other: SweepReport) {
        self.scanned += other.scanned;
        self.removed += other.removed;
        self.failed += other.failed;
    }
}

impl LocalBlobStore {
    /// Open (and create if needed) a store rooted at `base_path`.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        for bucket in Bucket::ALL {
            let dir = base_path.join(bucket.as_str());
            fs::create_dir_all(&dir).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(LocalBlobStore { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn bucket_dir(&self, bucket: Bucket) -> PathBuf {
        self.base_path.join(bucket.as_str())
    }

    fn blob_path(&self, file_id: &FileId, bucket: Bucket) -> PathBuf {
        self.bucket_dir(bucket).join(blob_filename(file_id))
    }

    /// Filesystem path of an existing blob, or `NotFound`.
    pub async fn resolve_path(&self, file_id: &FileId, bucket: Bucket) -> StorageResult<PathBuf> {
        let path = self.blob_path(file_id, bucket);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(StorageError::NotFound(path.display().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    /// Delete every regular file in `bucket` whose modification time is older
    /// than `max_age`. Failures on individual files are logged and counted; the
    /// sweep continues with the remaining entries.
    pub async fn sweep_older_than(
        &self,
        bucket: Bucket,
        max_age: Duration,
    ) -> StorageResult<SweepReport> {
        let dir = self.bucket_dir(bucket);
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let mut report = SweepReport::default();

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(report),
            Err(e) => return Err(StorageError::IoError(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let modified = match entry.metadata().await {
                Ok(meta) if meta.is_file() => meta.modified(),
                Ok(_) => continue,
                Err(e) => Err(e),
            };
            report.scanned += 1;

            let modified = match modified {
                Ok(modified) => modified,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read file modification time");
                    report.failed += 1;
                    continue;
                }
            };

            if modified >= cutoff {
                continue;
            }

            match fs::remove_file(&path).await {
                Ok(()) => {
                    tracing::info!(path = %path.display(), bucket = %bucket, "Deleted expired file");
                    report.removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to delete expired file");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Sweep both buckets.
    pub async fn sweep_all(&self, max_age: Duration) -> StorageResult<SweepReport> {
        let mut total = SweepReport::default();
        for bucket in Bucket::ALL {
            total.merge(self.sweep_older_than(bucket, max_age).await?);
        }
        Ok(total)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn save(&self, file_id: &FileId, bucket: Bucket, data: Bytes) -> StorageResult<()> {
        let path = self.blob_path(file_id, bucket);
        // Written next to the target and renamed so readers never observe a partial blob.
        let partial = path.with_extension("pdf.partial");
        let size = data.len();
        let start = Instant::now();

        let mut file = fs::File::create(&partial).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", partial.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", partial.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", partial.display(), e))
        })?;
        drop(file);

        if let Err(e) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to move file into place {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            file_id = %file_id,
            bucket = %bucket,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage save successful"
        );

        Ok(())
    }

    async fn load(&self, file_id: &FileId, bucket: Bucket) -> StorageResult<Bytes> {
        let path = self.resolve_path(file_id, bucket).await?;

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(Bytes::from(data))
    }

    async fn exists(&self, file_id: &FileId, bucket: Bucket) -> StorageResult<bool> {
        match self.resolve_path(file_id, bucket).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn content_length(&self, file_id: &FileId, bucket: Bucket) -> StorageResult<u64> {
        let path = self.resolve_path(file_id, bucket).await?;
        Ok(fs::metadata(&path).await?.len())
    }

    async fn delete(&self, file_id: &FileId, bucket: Bucket) -> StorageResult<()> {
        let path = self.blob_path(file_id, bucket);

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), file_id = %file_id, "Local storage delete successful");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn kind(&self) -> StorageKind {
        StorageKind::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn set_age(path: &Path, age: Duration) {
        let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[tokio::test]
    async fn test_new_creates_bucket_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(temp_dir.path().join("storage")).await.unwrap();

        assert!(store.bucket_dir(Bucket::Input).is_dir());
        assert!(store.bucket_dir(Bucket::Output).is_dir());
    }

    #[tokio::test]
    async fn test_save_load_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(temp_dir.path()).await.unwrap();
        let id = FileId::new();

        assert!(!store.exists(&id, Bucket::Input).await.unwrap());

        store
            .save(&id, Bucket::Input, Bytes::from_static(b"%PDF-1.4 hello"))
            .await
            .unwrap();

        assert!(store.exists(&id, Bucket::Input).await.unwrap());
        assert!(!store.exists(&id, Bucket::Output).await.unwrap());
        assert_eq!(store.content_length(&id, Bucket::Input).await.unwrap(), 14);
        assert_eq!(
            store.load(&id, Bucket::Input).await.unwrap(),
            Bytes::from_static(b"%PDF-1.4 hello")
        );

        let path = store.resolve_path(&id, Bucket::Input).await.unwrap();
        assert_eq!(path, temp_dir.path().join("input").join(format!("{}.pdf", id)));

        store.delete(&id, Bucket::Input).await.unwrap();
        assert!(!store.exists(&id, Bucket::Input).await.unwrap());
        // Second delete is a no-op.
        store.delete(&id, Bucket::Input).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(temp_dir.path()).await.unwrap();

        let err = store.load(&FileId::new(), Bucket::Output).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_save_replaces_existing_blob() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(temp_dir.path()).await.unwrap();
        let id = FileId::new();

        store.save(&id, Bucket::Output, Bytes::from_static(b"first")).await.unwrap();
        store.save(&id, Bucket::Output, Bytes::from_static(b"second")).await.unwrap();

        assert_eq!(store.load(&id, Bucket::Output).await.unwrap(), Bytes::from_static(b"second"));
        let leftovers: Vec<_> = std::fs::read_dir(store.bucket_dir(Bucket::Output))
            .unwrap()
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(temp_dir.path()).await.unwrap();
        let old = FileId::new();
        let fresh = FileId::new();

        store.save(&old, Bucket::Input, Bytes::from_static(b"old")).await.unwrap();
        store.save(&fresh, Bucket::Input, Bytes::from_static(b"fresh")).await.unwrap();
        store.save(&old, Bucket::Output, Bytes::from_static(b"old out")).await.unwrap();

        set_age(
            &store.resolve_path(&old, Bucket::Input).await.unwrap(),
            Duration::from_secs(25 * 3600),
        );
        set_age(
            &store.resolve_path(&fresh, Bucket::Input).await.unwrap(),
            Duration::from_secs(3600),
        );
        set_age(
            &store.resolve_path(&old, Bucket::Output).await.unwrap(),
            Duration::from_secs(25 * 3600),
        );

        let report = store.sweep_all(Duration::from_secs(24 * 3600)).await.unwrap();

        assert_eq!(report.scanned, 3);
        assert_eq!(report.removed, 2);
        assert_eq!(report.failed, 0);
        assert!(!store.exists(&old, Bucket::Input).await.unwrap());
        assert!(!store.exists(&old, Bucket::Output).await.unwrap());
        assert!(store.exists(&fresh, Bucket::Input).await.unwrap());
    }

    #[tokio::test]
    async fn test_sweep_ignores_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(temp_dir.path()).await.unwrap();
        std::fs::create_dir(store.bucket_dir(Bucket::Input).join("nested")).unwrap();

        let report = store.sweep_older_than(Bucket::Input, Duration::ZERO).await.unwrap();

        assert_eq!(report, SweepReport::default());
        assert!(store.bucket_dir(Bucket::Input).join("nested").is_dir());
    }
}
