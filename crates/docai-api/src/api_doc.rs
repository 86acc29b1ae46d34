//! OpenAPI documentation.
//! Handler annotations use unprefixed paths; the served document is rewritten
//! for the configured `ROOT_PATH`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use docai_core::models;

/// Prefix every path key with `root_path`.
fn prefix_openapi_paths(spec: &mut utoipa::openapi::OpenApi, root_path: &str) {
    if root_path.is_empty() {
        return;
    }
    let path_map = std::mem::take(&mut spec.paths.paths);
    for (key, item) in path_map {
        let new_key = if key == "/" {
            root_path.to_string()
        } else {
            format!("{}{}", root_path, key)
        };
        spec.paths.paths.insert(new_key, item);
    }
}

/// Returns the OpenAPI spec with paths as clients see them under `root_path`.
pub fn get_openapi_spec(root_path: &str) -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    prefix_openapi_paths(&mut spec, root_path);
    spec
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DocAI API",
        version = "0.1.0",
        description = "Upload PDF documents, convert them in the background and download the result."
    ),
    paths(
        handlers::index::index,
        handlers::health::health_check,
        handlers::upload::upload_document,
        handlers::download::download_document,
        handlers::status::conversion_status,
    ),
    components(
        schemas(
            models::UploadResponse,
            models::StatusResponse,
            models::ConversionStatus,
            models::FileId,
            handlers::health::HealthResponse,
            handlers::upload::UploadForm,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "documents", description = "Upload, conversion status and download"),
        (name = "health", description = "Liveness"),
        (name = "pages", description = "Browser UI")
    )
)]
pub struct ApiDoc;
