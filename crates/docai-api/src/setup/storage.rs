//! Storage setup and initialization

use anyhow::{Context, Result};
use docai_core::Config;
use docai_storage::{create_storage, StorageBackend};

pub async fn setup_storage(config: &Config) -> Result<StorageBackend> {
    tracing::info!(backend = %config.storage.backend, "Initializing storage");

    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;

    match &storage {
        StorageBackend::Local(store) => tracing::info!(
            path = %store.base_path().display(),
            "Local storage initialized"
        ),
        StorageBackend::Remote(store) => tracing::info!(
            bucket = %store.bucket_name(),
            region = ?config.s3_region(),
            "S3 storage initialized"
        ),
    }

    Ok(storage)
}
