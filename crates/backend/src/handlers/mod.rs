pub mod a001_catalog;

use std::sync::Arc;

use crate::domain::a001_catalog::CatalogService;

/// Общее состояние обработчиков
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
}
