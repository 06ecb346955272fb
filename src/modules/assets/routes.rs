use axum::Router;
use std::path::Path;
use tower_http::services::ServeFile;

use crate::AppState;

/// Front-end page and its loading spinner, served straight from `static_dir`.
pub fn routes(static_dir: &Path) -> Router<AppState> {
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route_service("/loader.gif", ServeFile::new(static_dir.join("loader.gif")))
}
