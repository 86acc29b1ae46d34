use crate::state::AppState;
use axum::{extract::State, response::Html};
use std::sync::Arc;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");
const ROOT_PATH_PLACEHOLDER: &str = "{{ROOT_PATH}}";

/// Render the index page for a normalised URL prefix.
pub fn render_index(root_path: &str) -> String {
    INDEX_TEMPLATE.replace(ROOT_PATH_PLACEHOLDER, root_path)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "pages",
    responses(
        (status = 200, description = "Upload page", content_type = "text/html")
    )
)]
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.index_html.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_root_path() {
        let page = render_index("/docai");
        assert!(!page.contains(ROOT_PATH_PLACEHOLDER));
        assert!(page.contains("\"/docai\""));
    }
}
