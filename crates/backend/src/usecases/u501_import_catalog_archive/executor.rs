use contracts::usecases::u501_import_catalog_archive::ArchiveImportResponse;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::domain::a001_catalog::CatalogService;

/// Папка с фотографиями внутри архива
const IMAGES_DIR_NAME: &str = "images";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Not a ZIP archive: {0}")]
    NotZip(String),

    #[error("Corrupt archive: {0}")]
    Corrupt(#[from] ZipError),

    #[error("Unsafe path in archive: {0}")]
    UnsafePath(String),

    #[error("Archive contains neither a spreadsheet nor images")]
    NothingToImport,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Ошибка в самом архиве (виноват клиент), а не на сервере
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ArchiveError::Io(_))
    }
}

/// Что распаковано из архива
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveExtraction {
    pub spreadsheet: Option<String>,
    pub images_extracted: usize,
}

enum Target {
    Spreadsheet,
    Image(PathBuf),
}

/// Загрузка архива с каталогом: распаковка и перезагрузка каталога
pub async fn import_archive(
    service: &CatalogService,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<ArchiveImportResponse, ArchiveError> {
    if !file_name.to_ascii_lowercase().ends_with(".zip") {
        return Err(ArchiveError::NotZip(file_name.to_string()));
    }

    tracing::info!("Importing catalog archive {} ({} bytes)", file_name, bytes.len());

    let source_path = service.source_path().to_path_buf();
    let images_dir = service.images_dir().to_path_buf();
    let extraction = tokio::task::spawn_blocking(move || {
        extract_catalog_archive(&bytes, &source_path, &images_dir)
    })
    .await
    .map_err(|e| ArchiveError::Io(std::io::Error::other(e.to_string())))??;

    tracing::info!(
        "Archive extracted: spreadsheet={:?}, images={}",
        extraction.spreadsheet,
        extraction.images_extracted
    );

    let summary = service.reload().await;
    Ok(ArchiveImportResponse {
        spreadsheet: extraction.spreadsheet,
        images_extracted: extraction.images_extracted,
        summary,
    })
}

/// Распаковывает архив: первая таблица `*.xlsx` записывается в `source_path`,
/// содержимое папки `images/` - в `images_dir` с сохранением подпапок.
///
/// Все пути проверяются до записи первого файла.
pub fn extract_catalog_archive(
    bytes: &[u8],
    source_path: &Path,
    images_dir: &Path,
) -> Result<ArchiveExtraction, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut plan: Vec<(usize, Target)> = Vec::new();
    let mut spreadsheet = None;

    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        let raw_name = entry.name().to_string();
        let Some(path) = entry.enclosed_name() else {
            return Err(ArchiveError::UnsafePath(raw_name));
        };
        if entry.is_dir() || is_system_entry(&path) {
            continue;
        }

        if spreadsheet.is_none() && is_spreadsheet(&path) {
            spreadsheet = Some(raw_name);
            plan.push((index, Target::Spreadsheet));
        } else if let Some(relative) = image_relative_path(&path) {
            plan.push((index, Target::Image(relative)));
        }
    }

    if plan.is_empty() {
        return Err(ArchiveError::NothingToImport);
    }

    let mut images_extracted = 0;
    for (index, target) in plan {
        let mut entry = archive.by_index(index)?;
        // Размер из заголовка архива не проверен, буфер растет по факту чтения
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;

        match target {
            Target::Spreadsheet => write_replacing(source_path, &content)?,
            Target::Image(relative) => {
                let path = images_dir.join(relative);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, &content)?;
                images_extracted += 1;
            }
        }
    }

    Ok(ArchiveExtraction {
        spreadsheet,
        images_extracted,
    })
}

/// Таблица заменяется через временный файл, чтобы загрузчик не увидел
/// недописанный xlsx
fn write_replacing(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("xlsx.part");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)
}

fn is_system_entry(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => {
            let name = name.to_string_lossy();
            name == "__MACOSX" || name.starts_with("._") || name == ".DS_Store"
        }
        _ => false,
    })
}

fn is_spreadsheet(path: &Path) -> bool {
    let is_xlsx = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    // ~$products.xlsx - файл блокировки открытого Excel
    let is_lock = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with("~$"));
    is_xlsx && !is_lock
}

/// Путь внутри `images/` (на любой глубине архива)
fn image_relative_path(path: &Path) -> Option<PathBuf> {
    let mut components = path.components();
    components.by_ref().find(|c| match c {
        Component::Normal(name) => name.eq_ignore_ascii_case(IMAGES_DIR_NAME),
        _ => false,
    })?;
    let relative: PathBuf = components.collect();
    (!relative.as_os_str().is_empty()).then_some(relative)
}
