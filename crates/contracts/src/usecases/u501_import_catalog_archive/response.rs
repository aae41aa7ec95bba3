use serde::{Deserialize, Serialize};

use crate::domain::a001_catalog::ReloadSummary;

/// Результат загрузки ZIP-архива с каталогом
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveImportResponse {
    /// Имя таблицы внутри архива, если она там была
    pub spreadsheet: Option<String>,
    /// Сколько фотографий распаковано
    pub images_extracted: usize,
    pub summary: ReloadSummary,
}
