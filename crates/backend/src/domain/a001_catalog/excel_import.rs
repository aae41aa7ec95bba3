use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{DateTime, Utc};
use contracts::domain::a001_catalog::{
    CatalogState, FallbackReason, ProductRecord, RejectionKind, ReloadSummary,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::default_catalog::default_catalog;
use super::mapper::ProductMapper;
use crate::shared::excel::{data_rows, RawRow};

/// Почему таблица не дала каталог
#[derive(Debug, Error)]
pub enum CatalogSourceError {
    #[error("source not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("source {} is unreadable: {cause}", .path.display())]
    SourceCorrupt { path: PathBuf, cause: String },

    #[error("source {} has no valid products", .0.display())]
    EmptyResult(PathBuf),
}

impl CatalogSourceError {
    pub fn reason(&self) -> FallbackReason {
        match self {
            CatalogSourceError::SourceMissing(path) => FallbackReason::SourceMissing {
                path: path.display().to_string(),
            },
            CatalogSourceError::SourceCorrupt { path, cause } => FallbackReason::SourceCorrupt {
                path: path.display().to_string(),
                cause: cause.clone(),
            },
            CatalogSourceError::EmptyResult(path) => FallbackReason::EmptyResult {
                path: path.display().to_string(),
            },
        }
    }
}

/// Чем закончилась загрузка
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded,
    Fallback(CatalogSourceError),
}

/// Результат загрузки: каталог всегда есть, даже при ошибке источника
#[derive(Debug)]
pub struct CatalogLoad {
    pub products: Vec<ProductRecord>,
    pub skipped: BTreeMap<RejectionKind, usize>,
    pub outcome: LoadOutcome,
}

impl CatalogLoad {
    pub fn fallback(error: CatalogSourceError) -> Self {
        Self::fallback_with_skipped(error, BTreeMap::new())
    }

    fn fallback_with_skipped(
        error: CatalogSourceError,
        skipped: BTreeMap<RejectionKind, usize>,
    ) -> Self {
        log_fallback(&error);
        Self {
            products: default_catalog(),
            skipped,
            outcome: LoadOutcome::Fallback(error),
        }
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn state(&self) -> CatalogState {
        match self.outcome {
            LoadOutcome::Loaded => CatalogState::Loaded,
            LoadOutcome::Fallback(_) => CatalogState::FallbackLoaded,
        }
    }

    pub fn summary(&self, version: u64, loaded_at: DateTime<Utc>) -> ReloadSummary {
        let fallback_reason = match &self.outcome {
            LoadOutcome::Loaded => None,
            LoadOutcome::Fallback(error) => Some(error.reason()),
        };
        ReloadSummary {
            version,
            loaded: self.products.len(),
            skipped: self.skipped_total(),
            skipped_by_reason: self.skipped.clone(),
            with_photos: self.products.iter().filter(|p| p.has_photo()).count(),
            fallback_used: fallback_reason.is_some(),
            fallback_reason,
            loaded_at,
        }
    }
}

/// Загружает каталог из таблицы. Никогда не возвращает ошибку: любая
/// проблема с файлом превращается в каталог по умолчанию с причиной.
pub fn load_catalog(path: &Path, sheet: Option<&str>, mapper: &ProductMapper) -> CatalogLoad {
    match read_rows(path, sheet, mapper.layout().width()) {
        Ok(rows) => build_catalog(path, &rows, mapper),
        Err(error) => CatalogLoad::fallback(error),
    }
}

/// Открывает книгу и читает строки данных нужного листа
pub fn read_rows(
    path: &Path,
    sheet: Option<&str>,
    width: usize,
) -> Result<Vec<RawRow>, CatalogSourceError> {
    if !path.exists() {
        return Err(CatalogSourceError::SourceMissing(path.to_path_buf()));
    }

    let corrupt = |cause: String| CatalogSourceError::SourceCorrupt {
        path: path.to_path_buf(),
        cause,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| corrupt(e.to_string()))?;
    let range: Range<Data> = match sheet {
        Some(name) => workbook
            .worksheet_range(name)
            .map_err(|e| corrupt(format!("sheet '{name}': {e}")))?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| corrupt("workbook has no worksheets".to_string()))?
            .map_err(|e| corrupt(e.to_string()))?,
    };

    Ok(data_rows(&range, width))
}

/// Собирает каталог из прочитанных строк: маппинг, подсчет пропусков,
/// стабильная сортировка по приоритету.
///
/// Id товаров идут подряд с 1 в порядке строк таблицы и назначаются
/// до сортировки.
pub fn build_catalog(path: &Path, rows: &[RawRow], mapper: &ProductMapper) -> CatalogLoad {
    let mut products = Vec::new();
    let mut skipped: BTreeMap<RejectionKind, usize> = BTreeMap::new();

    for row in rows {
        // Пустые строки в конце листа (форматирование) - не товары
        if row.is_blank() {
            continue;
        }
        match mapper.map_row(row) {
            Ok(product) => products.push(product),
            Err(rejection) => {
                tracing::debug!("Row {} skipped: {}", row.row_number, rejection);
                *skipped.entry(rejection.kind()).or_default() += 1;
            }
        }
    }

    if products.is_empty() {
        let error = CatalogSourceError::EmptyResult(path.to_path_buf());
        return CatalogLoad::fallback_with_skipped(error, skipped);
    }

    // Номера по порядку строк в таблице, до сортировки
    for (idx, product) in products.iter_mut().enumerate() {
        product.id = idx as u32 + 1;
    }
    // sort_by_key стабилен: при равном приоритете сохраняется порядок строк
    products.sort_by_key(|p| p.priority);

    let load = CatalogLoad {
        products,
        skipped,
        outcome: LoadOutcome::Loaded,
    };
    tracing::info!(
        "Catalog loaded from {}: products={}, skipped={}, with_photos={}",
        path.display(),
        load.products.len(),
        load.skipped_total(),
        load.products.iter().filter(|p| p.has_photo()).count()
    );
    load
}

fn log_fallback(error: &CatalogSourceError) {
    match error {
        CatalogSourceError::SourceMissing(_) => {
            tracing::warn!("{}; using default catalog", error)
        }
        CatalogSourceError::SourceCorrupt { .. } => {
            tracing::error!("{}; using default catalog", error)
        }
        CatalogSourceError::EmptyResult(_) => {
            tracing::warn!("{}; using default catalog", error)
        }
    }
}
