use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Состояние каталога в памяти
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogState {
    NotLoaded,
    Loading,
    /// Каталог построен из таблицы
    Loaded,
    /// Используется встроенный каталог по умолчанию
    FallbackLoaded,
}

/// Почему строка таблицы не попала в каталог
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    MissingName,
    MissingPrice,
}

/// Почему вместо таблицы используется каталог по умолчанию
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackReason {
    SourceMissing { path: String },
    SourceCorrupt { path: String, cause: String },
    EmptyResult { path: String },
}

/// Итог перезагрузки каталога (отдается оператору)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadSummary {
    /// Версия опубликованного каталога
    pub version: u64,
    /// Сколько товаров в каталоге
    pub loaded: usize,
    /// Сколько строк таблицы пропущено
    pub skipped: usize,
    pub skipped_by_reason: BTreeMap<RejectionKind, usize>,
    /// Товаров с настоящими фото
    pub with_photos: usize,
    pub fallback_used: bool,
    pub fallback_reason: Option<FallbackReason>,
    pub loaded_at: DateTime<Utc>,
}

/// Ответ GET /api/catalog/status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatus {
    pub state: CatalogState,
    pub summary: Option<ReloadSummary>,
}
