//! Application state shared by every handler.

use docai_core::Config;
use docai_infra::CleanupService;
use docai_storage::StorageBackend;
use docai_worker::{ConversionQueue, JobTracker};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: StorageBackend,
    pub conversion: ConversionState,
    pub cleanup: Arc<CleanupService>,
    /// Index page with the URL prefix already substituted.
    pub index_html: Arc<str>,
}

/// Background conversion queue and the tracker it reports to.
#[derive(Clone)]
pub struct ConversionState {
    pub queue: ConversionQueue,
    pub tracker: JobTracker,
}
