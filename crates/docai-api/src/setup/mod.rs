//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use docai_core::Config;
use std::sync::Arc;

/// Initialize the entire application: telemetry, storage, background workers
/// and routes. Cleanup is started here, before the server accepts requests.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    docai_infra::init_telemetry(config.server.log_format)
        .context("Failed to initialize telemetry")?;

    config.validate().context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.server.environment,
        root_path = %config.root_path(),
        "Configuration loaded and validated successfully"
    );

    let storage = storage::setup_storage(&config).await?;
    let state = services::initialize_services(&config, storage)?;
    let _cleanup_task = services::start_background_tasks(&state);

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
