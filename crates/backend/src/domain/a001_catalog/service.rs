use chrono::Utc;
use contracts::domain::a001_catalog::{CatalogState, CatalogStatus, ProductRecord, ReloadSummary};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::excel_import::{self, CatalogLoad, CatalogSourceError};
use super::mapper::ProductMapper;
use super::repository::CatalogStore;
use crate::shared::config::{resolve_path, Config};
use crate::usecases::u502_enrich_from_product_pages::{
    enrich_rows, HttpProductPageSource, ProductPageSource,
};

/// Где лежат файлы каталога
#[derive(Debug, Clone)]
pub struct CatalogPaths {
    pub source: PathBuf,
    pub images_dir: PathBuf,
    pub sheet: Option<String>,
}

/// Дозаполнение строк со страниц товаров
struct Enrichment {
    source: Arc<dyn ProductPageSource>,
    delay: Duration,
}

/// Сервис каталога: перечитывает таблицу и публикует результат в хранилище
pub struct CatalogService {
    store: CatalogStore,
    mapper: Arc<ProductMapper>,
    paths: CatalogPaths,
    enrichment: Option<Enrichment>,
    // Перезагрузки выполняются строго по одной
    reload_lock: Mutex<()>,
}

impl CatalogService {
    pub fn new(store: CatalogStore, mapper: ProductMapper, paths: CatalogPaths) -> Self {
        Self {
            store,
            mapper: Arc::new(mapper),
            paths,
            enrichment: None,
            reload_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let paths = CatalogPaths {
            source: resolve_path(&config.catalog.source),
            images_dir: resolve_path(&config.catalog.images_dir),
            sheet: config.catalog.sheet.clone(),
        };
        let mapper = ProductMapper::new(config.layout.clone(), &config.gender, &config.catalog);
        let mut service = Self::new(CatalogStore::new(), mapper, paths);

        if config.scrape.enabled {
            let source = HttpProductPageSource::new(&config.scrape)?;
            service = service.with_page_source(
                Arc::new(source),
                Duration::from_millis(config.scrape.delay_ms),
            );
            tracing::info!("Product page enrichment enabled");
        }
        Ok(service)
    }

    pub fn with_page_source(mut self, source: Arc<dyn ProductPageSource>, delay: Duration) -> Self {
        self.enrichment = Some(Enrichment { source, delay });
        self
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn source_path(&self) -> &Path {
        &self.paths.source
    }

    pub fn images_dir(&self) -> &Path {
        &self.paths.images_dir
    }

    pub fn products(&self) -> Arc<[ProductRecord]> {
        self.store.products()
    }

    pub fn status(&self) -> CatalogStatus {
        self.store.status()
    }

    /// Перечитать каталог сейчас.
    ///
    /// Ошибок не возвращает: при проблемах с таблицей публикуется каталог
    /// по умолчанию, причина попадает в сводку.
    pub async fn reload(&self) -> ReloadSummary {
        let _guard = self.reload_lock.lock().await;
        let previous = self.store.state();
        self.store.set_state(CatalogState::Loading);

        let load = self.load().await;
        let state = load.state();
        let mut summary = load.summary(0, Utc::now());
        summary.version = self.store.publish(load.products, state, summary.clone());

        tracing::info!(
            "Catalog v{} published ({:?} -> {:?}): loaded={}, skipped={}, fallback={}",
            summary.version,
            previous,
            state,
            summary.loaded,
            summary.skipped,
            summary.fallback_used
        );
        summary
    }

    async fn load(&self) -> CatalogLoad {
        let path = self.paths.source.clone();
        let sheet = self.paths.sheet.clone();
        let mapper = Arc::clone(&self.mapper);

        let Some(enrichment) = &self.enrichment else {
            return run_blocking(path.clone(), move || {
                excel_import::load_catalog(&path, sheet.as_deref(), &mapper)
            })
            .await;
        };

        let width = mapper.layout().width();
        let read_path = path.clone();
        let rows = tokio::task::spawn_blocking(move || {
            excel_import::read_rows(&read_path, sheet.as_deref(), width)
        })
        .await
        .unwrap_or_else(|e| Err(join_failure(&path, e)));

        let mut rows = match rows {
            Ok(rows) => rows,
            Err(error) => return CatalogLoad::fallback(error),
        };

        enrich_rows(
            &mut rows,
            mapper.layout(),
            enrichment.source.as_ref(),
            enrichment.delay,
        )
        .await;

        run_blocking(path.clone(), move || {
            excel_import::build_catalog(&path, &rows, &mapper)
        })
        .await
    }
}

async fn run_blocking<F>(path: PathBuf, job: F) -> CatalogLoad
where
    F: FnOnce() -> CatalogLoad + Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(load) => load,
        Err(e) => CatalogLoad::fallback(join_failure(&path, e)),
    }
}

fn join_failure(path: &Path, error: tokio::task::JoinError) -> CatalogSourceError {
    CatalogSourceError::SourceCorrupt {
        path: path.to_path_buf(),
        cause: format!("loader task failed: {error}"),
    }
}
