use docai_storage::{StorageBackend, SweepReport};
use docai_worker::JobTracker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{interval, MissedTickBehavior};

/// Result of one cleanup pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub files: SweepReport,
    pub jobs_pruned: usize,
}

/// Removes expired documents from local storage and forgets finished jobs.
///
/// Remote storage is left alone; bucket lifecycle rules are expected to expire
/// objects there.
#[derive(Clone)]
pub struct CleanupService {
    storage: StorageBackend,
    tracker: Option<JobTracker>,
    max_age: Duration,
    /// `None` runs a single pass at startup.
    every: Option<Duration>,
    stop: Arc<Notify>,
}

impl CleanupService {
    pub fn new(
        storage: StorageBackend,
        tracker: Option<JobTracker>,
        max_age: Duration,
        every: Option<Duration>,
    ) -> Self {
        Self {
            storage,
            tracker,
            max_age,
            every,
            stop: Arc::new(Notify::new()),
        }
    }

    /// Ask a running cleanup loop to exit after its current pass.
    pub fn stop(&self) {
        self.stop.notify_one();
    }

    /// Start the background cleanup task. The first pass runs immediately.
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let Some(every) = self.every else {
                self.run_once().await;
                return;
            };

            let mut cleanup_interval = interval(every);
            cleanup_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = self.stop.notified() => {
                        tracing::info!("Cleanup service stopped");
                        break;
                    }
                    _ = cleanup_interval.tick() => {
                        self.run_once().await;
                    }
                }
            }
        })
    }

    /// One cleanup pass. Errors are logged and never returned.
    #[tracing::instrument(skip(self), fields(cleanup.max_age_secs = self.max_age.as_secs()))]
    pub async fn run_once(&self) -> CleanupReport {
        tracing::info!("Starting cleanup of expired files");

        let files = match &self.storage {
            StorageBackend::Local(store) => match store.sweep_all(self.max_age).await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to sweep local storage");
                    SweepReport::default()
                }
            },
            StorageBackend::Remote(_) => {
                tracing::debug!("Remote storage backend; skipping file sweep");
                SweepReport::default()
            }
        };

        let jobs_pruned = match &self.tracker {
            Some(tracker) => tracker.prune_finished(self.max_age).await,
            None => 0,
        };

        tracing::info!(
            scanned = files.scanned,
            removed = files.removed,
            failed = files.failed,
            jobs_pruned,
            "Cleanup completed"
        );

        CleanupReport { files, jobs_pruned }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use docai_core::{Bucket, FileId};
    use docai_storage::{BlobStore, LocalBlobStore};
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn age_file(path: &std::path::Path, age: Duration) {
        let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    async fn seeded_store(dir: &TempDir) -> (LocalBlobStore, FileId, FileId) {
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        let old = FileId::new();
        let recent = FileId::new();

        store.save(&old, Bucket::Input, Bytes::from_static(b"old")).await.unwrap();
        store.save(&recent, Bucket::Input, Bytes::from_static(b"recent")).await.unwrap();

        age_file(
            &store.resolve_path(&old, Bucket::Input).await.unwrap(),
            Duration::from_secs(25 * 3600),
        );
        age_file(
            &store.resolve_path(&recent, Bucket::Input).await.unwrap(),
            Duration::from_secs(3600),
        );

        (store, old, recent)
    }

    #[tokio::test]
    async fn test_run_once_removes_only_expired_files() {
        let dir = TempDir::new().unwrap();
        let (store, old, recent) = seeded_store(&dir).await;
        let service = CleanupService::new(
            store.clone().into(),
            None,
            Duration::from_secs(24 * 3600),
            None,
        );

        let report = service.run_once().await;

        assert_eq!(report.files.removed, 1);
        assert_eq!(report.files.failed, 0);
        assert!(!store.exists(&old, Bucket::Input).await.unwrap());
        assert!(store.exists(&recent, Bucket::Input).await.unwrap());
    }

    #[tokio::test]
    async fn test_run_once_prunes_finished_jobs() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        let tracker = JobTracker::new();
        let done = FileId::new();
        let queued = FileId::new();
        tracker.mark_completed(done).await;
        tracker.mark_queued(queued).await;

        let service = CleanupService::new(store.into(), Some(tracker.clone()), Duration::ZERO, None);
        let report = service.run_once().await;

        assert_eq!(report.jobs_pruned, 1);
        assert!(tracker.get(&done).await.is_none());
        assert!(tracker.get(&queued).await.is_some());
    }

    #[tokio::test]
    async fn test_start_runs_single_pass_without_interval() {
        let dir = TempDir::new().unwrap();
        let (store, old, recent) = seeded_store(&dir).await;
        let service = Arc::new(CleanupService::new(
            store.clone().into(),
            None,
            Duration::from_secs(24 * 3600),
            None,
        ));

        tokio::time::timeout(Duration::from_secs(5), service.start())
            .await
            .unwrap()
            .unwrap();

        assert!(!store.exists(&old, Bucket::Input).await.unwrap());
        assert!(store.exists(&recent, Bucket::Input).await.unwrap());
    }

    #[tokio::test]
    async fn test_stop_ends_recurring_loop() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        let service = Arc::new(CleanupService::new(
            store.into(),
            None,
            Duration::from_secs(24 * 3600),
            Some(Duration::from_secs(3600)),
        ));

        let handle = service.clone().start();
        service.stop();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
