//! Startup cleanup wiring.
//!
//! Run with: `cargo test -p docai-api --test cleanup_test`

mod helpers;

use bytes::Bytes;
use docai_api::setup::services;
use docai_core::{Bucket, FileId};
use docai_storage::BlobStore;
use docai_worker::PassthroughConverter;
use helpers::setup_test_app_with;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

fn age_file(path: &std::path::Path, age: Duration) {
    let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}

#[tokio::test]
async fn test_startup_sweep_removes_only_expired_documents() {
    let app = setup_test_app_with(Arc::new(PassthroughConverter), |config| {
        config.cleanup.interval_secs = 0;
    })
    .await;
    let store = app.state.storage.as_local().unwrap().clone();

    let old = FileId::new();
    let recent = FileId::new();
    for (id, bucket) in [(old, Bucket::Input), (old, Bucket::Output), (recent, Bucket::Output)] {
        store.save(&id, bucket, Bytes::from_static(b"%PDF-1.4")).await.unwrap();
    }
    for bucket in Bucket::ALL {
        age_file(
            &store.resolve_path(&old, bucket).await.unwrap(),
            Duration::from_secs(25 * 3600),
        );
    }
    age_file(
        &store.resolve_path(&recent, Bucket::Output).await.unwrap(),
        Duration::from_secs(3600),
    );

    let handle = services::start_background_tasks(&app.state);
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("startup sweep did not finish")
        .unwrap();

    assert!(!store.exists(&old, Bucket::Input).await.unwrap());
    assert!(!store.exists(&old, Bucket::Output).await.unwrap());
    assert!(store.exists(&recent, Bucket::Output).await.unwrap());
    assert_eq!(
        app.client()
            .get(&format!("/download/{}", old))
            .await
            .status_code(),
        404
    );
}
