//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p docai-api`. Every app gets its own
//! temporary storage directory; nothing touches the network.

#![allow(dead_code)]

pub mod converters;
pub mod fixtures;

use axum_test::TestServer;
use docai_api::setup::{routes, services};
use docai_api::AppState;
use docai_core::models::UploadResponse;
use docai_core::{Bucket, Config, FileId, StorageKind};
use docai_storage::{BlobStore, LocalBlobStore, RemoteBlobStore, StorageBackend};
use docai_worker::{Converter, JobRecord, PassthroughConverter};
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Upload cap used by every test app, small enough to exceed cheaply.
pub const TEST_MAX_UPLOAD_BYTES: usize = 1024;

pub const TEST_BUCKET: &str = "docai-test";

/// Test application: server, shared state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn blobs(&self) -> Arc<dyn BlobStore> {
        self.state.storage.blob_store()
    }

    /// Wait for the background conversion of `file_id` to finish.
    pub async fn wait_for_conversion(&self, file_id: &FileId) -> JobRecord {
        tokio::time::timeout(
            Duration::from_secs(5),
            self.state.conversion.tracker.wait_until_finished(file_id),
        )
        .await
        .expect("conversion did not finish in time")
        .expect("conversion job is not tracked")
    }

    /// Files currently present in a local bucket directory.
    pub fn local_blob_count(&self, bucket: Bucket) -> usize {
        let store = self
            .state
            .storage
            .as_local()
            .expect("test app is not using local storage");
        std::fs::read_dir(store.bucket_dir(bucket))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

fn test_config(temp_dir: &TempDir) -> Config {
    let mut config = Config::local(temp_dir.path().to_string_lossy().into_owned());
    config.max_upload_size_bytes = TEST_MAX_UPLOAD_BYTES;
    config
}

fn build_app(
    config: Config,
    storage: StorageBackend,
    converter: Arc<dyn Converter>,
    temp_dir: TempDir,
) -> TestApp {
    let state = services::initialize_services_with_converter(&config, storage, converter);
    let app = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

/// Local storage, passthrough converter, no root path.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(Arc::new(PassthroughConverter), |_| {}).await
}

/// Local storage with a custom converter and config tweaks.
pub async fn setup_test_app_with(
    converter: Arc<dyn Converter>,
    configure: impl FnOnce(&mut Config),
) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = test_config(&temp_dir);
    configure(&mut config);

    let storage = LocalBlobStore::new(temp_dir.path())
        .await
        .expect("Failed to create local storage");

    build_app(config, storage.into(), converter, temp_dir)
}

/// Remote storage backed by an in-memory object store. Signed URLs are
/// computed offline with fixed credentials.
pub async fn setup_remote_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = test_config(&temp_dir);
    config.storage.backend = StorageKind::S3;
    config.storage.s3_bucket = Some(TEST_BUCKET.to_string());

    let signer = AmazonS3Builder::new()
        .with_bucket_name(TEST_BUCKET)
        .with_region("us-east-1")
        .with_access_key_id("AKIDEXAMPLE")
        .with_secret_access_key("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY")
        .build()
        .expect("Failed to build offline signer");
    let store = RemoteBlobStore::from_parts(Arc::new(InMemory::new()), signer, TEST_BUCKET.to_string());

    build_app(config, store.into(), Arc::new(PassthroughConverter), temp_dir)
}

/// Upload a PDF and return the identifier from the response.
pub async fn upload_pdf(app: &TestApp, data: &[u8]) -> FileId {
    let response = app
        .client()
        .post("/upload")
        .multipart(fixtures::pdf_form(data))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: UploadResponse = response.json();
    assert_eq!(body.status, "processing");
    body.file_id
}
