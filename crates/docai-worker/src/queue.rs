//! Conversion queue: in-process submission channel plus a bounded worker pool.
//!
//! Shutdown: [`ConversionQueue::shutdown`] stops the dispatch loop. Jobs already
//! running finish on their own; jobs still in the channel are dropped and stay
//! `queued` in the tracker.

use anyhow::{anyhow, Context, Result};
use docai_core::{Bucket, FileId};
use docai_storage::BlobStore;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};

use crate::converter::Converter;
use crate::tracker::JobTracker;

#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub file_id: FileId,
}

#[derive(Clone)]
pub struct ConversionQueue {
    tx: mpsc::UnboundedSender<ConversionJob>,
    shutdown_tx: mpsc::Sender<()>,
    tracker: JobTracker,
}

struct Worker {
    storage: Arc<dyn BlobStore>,
    converter: Arc<dyn Converter>,
    tracker: JobTracker,
}

impl ConversionQueue {
    /// Start the worker pool and return a handle for submitting jobs.
    ///
    /// The channel is unbounded so a submission never blocks or gets rejected;
    /// `max_concurrent` bounds how many conversions run at once.
    pub fn new(
        storage: Arc<dyn BlobStore>,
        converter: Arc<dyn Converter>,
        tracker: JobTracker,
        max_concurrent: usize,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let max_concurrent = max_concurrent.max(1);

        let worker = Worker {
            storage,
            converter,
            tracker: tracker.clone(),
        };

        tracing::info!(
            max_concurrent = max_concurrent,
            converter = %worker.converter.name(),
            "Conversion queue initialized"
        );

        tokio::spawn(async move {
            Worker::worker_pool(Arc::new(worker), rx, shutdown_rx, max_concurrent).await;
        });

        Self {
            tx,
            shutdown_tx,
            tracker,
        }
    }

    /// Schedule a conversion for `file_id`. The input blob must already exist.
    #[tracing::instrument(skip_all, fields(file_id = %file_id))]
    pub async fn submit(&self, file_id: FileId) -> Result<()> {
        self.tracker.mark_queued(file_id).await;

        if self.tx.send(ConversionJob { file_id }).is_err() {
            self.tracker
                .mark_failed(file_id, "Conversion worker is not running")
                .await;
            return Err(anyhow!("Conversion worker is not running"));
        }

        tracing::debug!(file_id = %file_id, "Conversion job enqueued");
        Ok(())
    }

    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    /// Signal the worker pool to stop taking new jobs.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.try_send(());
    }
}

impl Worker {
    async fn worker_pool(
        worker: Arc<Worker>,
        mut rx: mpsc::UnboundedReceiver<ConversionJob>,
        mut shutdown_rx: mpsc::Receiver<()>,
        max_concurrent: usize,
    ) {
        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        loop {
            let job = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    tracing::info!("Conversion queue shutting down");
                    break;
                }
                job = rx.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
            };

            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let worker = worker.clone();

            tokio::spawn(async move {
                let _permit = permit;
                worker.process_job(job).await;
            });
        }
    }

    #[tracing::instrument(skip(self, job), fields(file_id = %job.file_id))]
    async fn process_job(&self, job: ConversionJob) {
        let start = Instant::now();
        self.tracker.mark_processing(job.file_id).await;
        tracing::info!(file_id = %job.file_id, "Starting conversion");

        match self.convert(&job.file_id).await {
            Ok(size) => {
                tracing::info!(
                    file_id = %job.file_id,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Conversion completed"
                );
                self.tracker.mark_completed(job.file_id).await;
            }
            Err(e) => {
                tracing::error!(
                    file_id = %job.file_id,
                    error = %format!("{:#}", e),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Conversion failed"
                );
                self.tracker
                    .mark_failed(job.file_id, format!("{:#}", e))
                    .await;
            }
        }
    }

    async fn convert(&self, file_id: &FileId) -> Result<usize> {
        let input = self
            .storage
            .load(file_id, Bucket::Input)
            .await
            .context("Failed to load input document")?;

        let output = self
            .converter
            .convert(input)
            .await
            .with_context(|| format!("Converter {} failed", self.converter.name()))?;
        let size = output.len();

        self.storage
            .save(file_id, Bucket::Output, output)
            .await
            .context("Failed to store converted document")?;

        Ok(size)
    }
}
