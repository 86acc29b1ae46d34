//! Service wiring: conversion queue, job tracker and cleanup.

use crate::handlers::index::render_index;
use crate::state::{AppState, ConversionState};
use anyhow::{Context, Result};
use docai_core::Config;
use docai_infra::CleanupService;
use docai_storage::StorageBackend;
use docai_worker::{converter_from_command, ConversionQueue, Converter, JobTracker};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Build the application state with the converter named by `CONVERTER_COMMAND`.
pub fn initialize_services(config: &Config, storage: StorageBackend) -> Result<Arc<AppState>> {
    let converter = converter_from_command(
        config.conversion.command.as_deref(),
        config.conversion_timeout(),
    )
    .context("Invalid CONVERTER_COMMAND")?;

    Ok(initialize_services_with_converter(config, storage, converter))
}

/// Build the application state around an explicit converter. Spawns the
/// conversion worker pool.
pub fn initialize_services_with_converter(
    config: &Config,
    storage: StorageBackend,
    converter: Arc<dyn Converter>,
) -> Arc<AppState> {
    let tracker = JobTracker::new();
    let queue = ConversionQueue::new(
        storage.blob_store(),
        converter,
        tracker.clone(),
        config.conversion.max_concurrent,
    );

    let cleanup = Arc::new(CleanupService::new(
        storage.clone(),
        Some(tracker.clone()),
        config.cleanup_max_age(),
        config.cleanup_interval(),
    ));

    Arc::new(AppState {
        config: config.clone(),
        storage,
        conversion: ConversionState { queue, tracker },
        cleanup,
        index_html: Arc::from(render_index(config.root_path())),
    })
}

/// Start the cleanup task. Its first pass runs right away; with
/// `CLEANUP_INTERVAL_SECS=0` the returned handle completes after that pass.
pub fn start_background_tasks(state: &AppState) -> JoinHandle<()> {
    let cleanup_task = state.cleanup.clone().start();
    tracing::info!(
        max_age_hours = state.config.cleanup.max_age_hours,
        interval_secs = state.config.cleanup.interval_secs,
        "Cleanup service started"
    );
    cleanup_task
}
