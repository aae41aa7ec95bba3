use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::handlers::{self, AppState};
use crate::shared::config::ServerConfig;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState, server: &ServerConfig) -> Router {
    let images_dir = state.catalog.images_dir().to_path_buf();
    let upload_limit = server.upload_limit_mb * 1024 * 1024;

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // Каталог для Mini App
        .route("/api/products", get(handlers::a001_catalog::list_products))
        .route("/api/catalog/status", get(handlers::a001_catalog::status))
        .route("/api/catalog/reload", post(handlers::a001_catalog::reload))
        .route(
            "/api/catalog/upload",
            post(handlers::a001_catalog::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Фотографии товаров
        .nest_service("/images", ServeDir::new(images_dir))
        .with_state(state)
}
