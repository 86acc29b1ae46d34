//! Route configuration and setup.

use crate::api_doc::get_openapi_spec;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    routing::post,
    Json, Router,
};
use docai_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa_rapidoc::RapiDoc;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Setup all application routes. With a non-empty `ROOT_PATH` every route is
/// served both under the prefix and at its bare path; generated URLs (index
/// page, OpenAPI document, RapiDoc) always carry the prefix.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let root_path = config.root_path().to_string();

    let openapi_spec = get_openapi_spec(&root_path);
    let routes = Router::new()
        .route("/", get(handlers::index::index))
        .route("/health", get(handlers::health::health_check))
        .route("/upload", post(handlers::upload::upload_document))
        .route(
            "/download/{file_id}",
            get(handlers::download::download_document).head(handlers::download::download_document),
        )
        .route("/status/{file_id}", get(handlers::status::conversion_status))
        .route(
            "/openapi.json",
            get(move || {
                let spec = openapi_spec.clone();
                async move { Json(spec) }
            }),
        )
        .merge(RapiDoc::new(format!("{}/openapi.json", root_path)).path("/docs"));

    // Every route answers with and without the prefix.
    let routes = if root_path.is_empty() {
        routes
    } else {
        Router::new().nest(&root_path, routes.clone()).merge(routes)
    };

    let http_concurrency_limit = config.server.http_concurrency_limit.max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        max_upload_size_bytes = config.max_upload_size_bytes,
        "HTTP layers configured"
    );

    let app = routes
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(
            config
                .max_upload_size_bytes
                .saturating_add(MULTIPART_OVERHEAD_BYTES),
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let origins = &config.server.cors_origins;
    let cors = if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new().allow_origin(origins)
    };

    Ok(cors
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allow_headers(Any))
}
