use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::app::AppConfig;
use crate::services::llm::GenerativeClient;

pub mod config;
pub mod modules;
pub mod services;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub llm: Arc<dyn GenerativeClient>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(modules::chat::routes::routes())
        .merge(modules::assets::routes::routes(&state.config.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
