use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use contracts::domain::a001_catalog::{CatalogStatus, ProductRecord, ReloadSummary};
use contracts::usecases::u501_import_catalog_archive::ArchiveImportResponse;

use super::AppState;
use crate::usecases::u501_import_catalog_archive::import_archive;

/// Поле формы с архивом
const UPLOAD_FIELD: &str = "file";

/// GET /api/products
pub async fn list_products(State(state): State<AppState>) -> Json<Vec<ProductRecord>> {
    Json(state.catalog.products().to_vec())
}

/// GET /api/catalog/status
pub async fn status(State(state): State<AppState>) -> Json<CatalogStatus> {
    Json(state.catalog.status())
}

/// POST /api/catalog/reload
pub async fn reload(State(state): State<AppState>) -> Json<ReloadSummary> {
    Json(state.catalog.reload().await)
}

/// POST /api/catalog/upload
///
/// ZIP с таблицей products_links.xlsx и папкой images/
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ArchiveImportResponse>, StatusCode> {
    let (file_name, bytes) = loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                tracing::warn!("Upload without '{}' field", UPLOAD_FIELD);
                return Err(StatusCode::BAD_REQUEST);
            }
            Err(e) => {
                tracing::warn!("Failed to read multipart body: {}", e);
                return Err(StatusCode::BAD_REQUEST);
            }
        };
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        match field.bytes().await {
            Ok(bytes) => break (file_name, bytes.to_vec()),
            Err(e) => {
                tracing::warn!("Failed to read uploaded file: {}", e);
                return Err(StatusCode::BAD_REQUEST);
            }
        }
    };

    match import_archive(&state.catalog, &file_name, bytes).await {
        Ok(response) => Ok(Json(response)),
        Err(e) if e.is_client_error() => {
            tracing::warn!("Archive rejected: {}", e);
            Err(StatusCode::BAD_REQUEST)
        }
        Err(e) => {
            tracing::error!("Archive import failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
