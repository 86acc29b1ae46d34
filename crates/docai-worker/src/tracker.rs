//! In-process record of conversion jobs.
//!
//! Records live only as long as the process. Every status change is also
//! published on a broadcast channel so callers can wait for a job to finish
//! instead of polling storage.

use chrono::{DateTime, Utc};
use docai_core::{ConversionStatus, FileId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub status: ConversionStatus,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEvent {
    pub file_id: FileId,
    pub status: ConversionStatus,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct JobTracker {
    records: Arc<RwLock<HashMap<FileId, JobRecord>>>,
    events: broadcast::Sender<JobEvent>,
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTracker {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    pub async fn mark_queued(&self, file_id: FileId) {
        self.set(file_id, ConversionStatus::Queued, None).await;
    }

    pub async fn mark_processing(&self, file_id: FileId) {
        self.set(file_id, ConversionStatus::Processing, None).await;
    }

    pub async fn mark_completed(&self, file_id: FileId) {
        self.set(file_id, ConversionStatus::Completed, None).await;
    }

    pub async fn mark_failed(&self, file_id: FileId, error: impl Into<String>) {
        self.set(file_id, ConversionStatus::Failed, Some(error.into()))
            .await;
    }

    async fn set(&self, file_id: FileId, status: ConversionStatus, error: Option<String>) {
        {
            let mut records = self.records.write().await;
            records.insert(
                file_id,
                JobRecord {
                    status,
                    error: error.clone(),
                    updated_at: Utc::now(),
                },
            );
        }

        // No receivers is the normal case outside tests.
        let _ = self.events.send(JobEvent {
            file_id,
            status,
            error,
        });
    }

    pub async fn get(&self, file_id: &FileId) -> Option<JobRecord> {
        self.records.read().await.get(file_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    /// Wait until `file_id` reaches `completed` or `failed`.
    ///
    /// Returns `None` if the tracker is dropped first. Callers that need a bound
    /// wrap this in `tokio::time::timeout`.
    pub async fn wait_until_finished(&self, file_id: &FileId) -> Option<JobRecord> {
        let mut events = self.subscribe();

        if let Some(record) = self.get(file_id).await {
            if record.status.is_finished() {
                return Some(record);
            }
        }

        loop {
            match events.recv().await {
                Ok(event) if event.file_id == *file_id && event.status.is_finished() => {
                    return self.get(file_id).await;
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    if let Some(record) = self.get(file_id).await {
                        if record.status.is_finished() {
                            return Some(record);
                        }
                    }
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Drop finished records last updated more than `max_age` ago. Records that
    /// are still queued or processing are kept. Returns the number removed.
    pub async fn prune_finished(&self, max_age: Duration) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|age| Utc::now().checked_sub_signed(age))
        else {
            return 0;
        };

        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !(record.status.is_finished() && record.updated_at <= cutoff));
        before - records.len()
    }
}
