use contracts::domain::a001_catalog::{CatalogState, CatalogStatus, ProductRecord, ReloadSummary};
use std::sync::{Arc, PoisonError, RwLock};

/// Опубликованная версия каталога
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub version: u64,
    pub products: Arc<[ProductRecord]>,
    pub summary: Option<ReloadSummary>,
}

#[derive(Debug)]
struct StoreInner {
    state: CatalogState,
    snapshot: Arc<CatalogSnapshot>,
}

/// Хранилище текущего каталога (in-memory).
///
/// Один писатель, много читателей: каталог заменяется целиком одной
/// операцией, читатель получает либо старую, либо новую версию.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                state: CatalogState::NotLoaded,
                snapshot: Arc::new(CatalogSnapshot {
                    version: 0,
                    products: Arc::from(Vec::new()),
                    summary: None,
                }),
            })),
        }
    }

    /// Текущий снимок
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&inner.snapshot)
    }

    pub fn products(&self) -> Arc<[ProductRecord]> {
        Arc::clone(&self.snapshot().products)
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version
    }

    pub fn state(&self) -> CatalogState {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    pub fn set_state(&self, state: CatalogState) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .state = state;
    }

    pub fn status(&self) -> CatalogStatus {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        CatalogStatus {
            state: inner.state,
            summary: inner.snapshot.summary.clone(),
        }
    }

    /// Публикует новый каталог и возвращает номер его версии
    pub fn publish(
        &self,
        products: Vec<ProductRecord>,
        state: CatalogState,
        mut summary: ReloadSummary,
    ) -> u64 {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let version = inner.snapshot.version + 1;
        summary.version = version;
        inner.snapshot = Arc::new(CatalogSnapshot {
            version,
            products: Arc::from(products),
            summary: Some(summary),
        });
        inner.state = state;
        version
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_catalog::default_catalog::default_catalog;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn summary(loaded: usize) -> ReloadSummary {
        ReloadSummary {
            version: 0,
            loaded,
            skipped: 0,
            skipped_by_reason: BTreeMap::new(),
            with_photos: 0,
            fallback_used: false,
            fallback_reason: None,
            loaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = CatalogStore::new();
        assert_eq!(store.state(), CatalogState::NotLoaded);
        assert_eq!(store.version(), 0);
        assert!(store.products().is_empty());
        assert!(store.status().summary.is_none());
    }

    #[test]
    fn test_publish_increments_version() {
        let store = CatalogStore::new();
        let v1 = store.publish(default_catalog(), CatalogState::Loaded, summary(6));
        let v2 = store.publish(Vec::new(), CatalogState::Loaded, summary(0));

        assert_eq!(v1, 1);
        assert_eq!(v2, 2);
        assert_eq!(store.version(), 2);
        assert_eq!(store.status().summary.map(|s| s.version), Some(2));
    }

    #[test]
    fn test_old_snapshot_survives_publish() {
        let store = CatalogStore::new();
        store.publish(default_catalog(), CatalogState::FallbackLoaded, summary(6));
        let before = store.snapshot();

        store.publish(Vec::new(), CatalogState::Loaded, summary(0));

        assert_eq!(before.version, 1);
        assert_eq!(before.products.len(), 6);
        assert!(store.products().is_empty());
        assert_eq!(store.state(), CatalogState::Loaded);
    }

    #[test]
    fn test_clones_share_state() {
        let store = CatalogStore::new();
        let reader = store.clone();
        store.set_state(CatalogState::Loading);
        store.publish(default_catalog(), CatalogState::Loaded, summary(6));

        assert_eq!(reader.state(), CatalogState::Loaded);
        assert_eq!(reader.products().len(), 6);
    }
}
