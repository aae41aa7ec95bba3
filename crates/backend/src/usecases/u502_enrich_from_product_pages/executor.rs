use std::time::Duration;

use super::page_client::{ProductPageSource, ScrapedProduct};
use crate::shared::config::ColumnLayout;
use crate::shared::excel::{CellValue, RawRow};

/// Итог дозаполнения строк
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentStats {
    /// Строк, для которых запрашивалась страница
    pub requested: usize,
    /// Строк, в которых заполнена хотя бы одна ячейка
    pub enriched: usize,
    pub failed: usize,
}

/// Нужна ли строке страница товара: есть ссылка, но нет названия или цены
pub fn needs_enrichment(row: &RawRow, layout: &ColumnLayout) -> bool {
    if row.is_blank() {
        return false;
    }
    let has_url = row
        .get(layout.url)
        .as_text()
        .is_some_and(|url| url.starts_with("http://") || url.starts_with("https://"));
    let no_name = row.get(layout.name).is_blank();
    let no_price = layout
        .price_candidates
        .iter()
        .all(|&column| row.get(column).is_blank());
    has_url && (no_name || no_price)
}

/// Дозаполняет пустые ячейки строк данными со страниц товаров.
///
/// Непустые ячейки не трогаются, строки не отбрасываются. Между запросами
/// выдерживается пауза `delay`.
pub async fn enrich_rows(
    rows: &mut [RawRow],
    layout: &ColumnLayout,
    source: &dyn ProductPageSource,
    delay: Duration,
) -> EnrichmentStats {
    let mut stats = EnrichmentStats::default();

    for row in rows.iter_mut() {
        if !needs_enrichment(row, layout) {
            continue;
        }
        let Some(url) = row.get(layout.url).as_text() else {
            continue;
        };

        if stats.requested > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        stats.requested += 1;

        match source.fetch(&url).await {
            Ok(scraped) => {
                if fill_blank_cells(row, layout, &scraped) {
                    stats.enriched += 1;
                }
            }
            Err(e) => {
                stats.failed += 1;
                tracing::warn!("Row {}: page fetch failed: {}", row.row_number, e);
            }
        }
    }

    if stats.requested > 0 {
        tracing::info!(
            "Enrichment done: requested={}, enriched={}, failed={}",
            stats.requested,
            stats.enriched,
            stats.failed
        );
    }
    stats
}

/// Возвращает true, если что-то было заполнено
pub fn fill_blank_cells(row: &mut RawRow, layout: &ColumnLayout, scraped: &ScrapedProduct) -> bool {
    let mut filled = false;

    if let Some(name) = &scraped.name {
        if row.get(layout.name).is_blank() {
            row.set(layout.name, CellValue::Text(name.clone()));
            filled = true;
        }
    }

    if let Some(price) = scraped.price {
        if row.get(layout.price_eur).is_blank() {
            row.set(layout.price_eur, CellValue::Number(price));
            filled = true;
        }
    }

    if !scraped.image_urls.is_empty() && row.get(layout.photo_urls).is_blank() {
        row.set(layout.photo_urls, CellValue::Text(scraped.image_urls.join(", ")));
        filled = true;
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_catalog::mapper::tests::RowBuilder;
    use crate::usecases::u502_enrich_from_product_pages::page_client::PageFetchError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Источник без сети: отдает заранее заданный товар и запоминает ссылки
    struct FakeSource {
        product: Option<ScrapedProduct>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn new(product: Option<ScrapedProduct>) -> Self {
            Self {
                product,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProductPageSource for FakeSource {
        async fn fetch(&self, url: &str) -> Result<ScrapedProduct, PageFetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            self.product
                .clone()
                .ok_or_else(|| PageFetchError::NothingFound(url.to_string()))
        }
    }

    fn scraped() -> ScrapedProduct {
        ScrapedProduct {
            name: Some("Mizuno Wave Lightning".into()),
            price: Some(119.5),
            image_urls: vec!["https://cdn/1.jpg".into(), "https://cdn/2.jpg".into()],
        }
    }

    #[tokio::test]
    async fn test_fills_only_blank_cells() {
        let layout = ColumnLayout::default();
        let mut rows = vec![RowBuilder::new(2)
            .text(0, "https://shop.com/p/1?ref=tg")
            .text(1, "Свое название")
            .build()];
        let source = FakeSource::new(Some(scraped()));

        let stats = enrich_rows(&mut rows, &layout, &source, Duration::ZERO).await;

        assert_eq!(stats.requested, 1);
        assert_eq!(stats.enriched, 1);
        let row = &rows[0];
        assert_eq!(row.get(1), &CellValue::Text("Свое название".into()));
        assert_eq!(row.get(2), &CellValue::Number(119.5));
        assert_eq!(
            row.get(6),
            &CellValue::Text("https://cdn/1.jpg, https://cdn/2.jpg".into())
        );
    }

    #[tokio::test]
    async fn test_complete_rows_not_fetched() {
        let layout = ColumnLayout::default();
        let mut rows = vec![
            RowBuilder::new(2)
                .text(0, "https://shop.com/p/1")
                .text(1, "Есть все")
                .number(15, 1000.0)
                .build(),
            RowBuilder::new(3).text(1, "Без ссылки").build(),
            RowBuilder::new(4).text(0, "не ссылка").build(),
            RawRow::new(5, Vec::new()),
        ];
        let source = FakeSource::new(Some(scraped()));

        let stats = enrich_rows(&mut rows, &layout, &source, Duration::ZERO).await;
        assert_eq!(stats, EnrichmentStats::default());
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failure_leaves_row_as_is() {
        let layout = ColumnLayout::default();
        let original = RowBuilder::new(2).text(0, "https://shop.com/p/9").build();
        let mut rows = vec![original.clone()];
        let source = FakeSource::new(None);

        let stats = enrich_rows(&mut rows, &layout, &source, Duration::ZERO).await;

        assert_eq!(stats.requested, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(rows[0], original);
        assert_eq!(source.calls(), vec!["https://shop.com/p/9"]);
    }

    #[test]
    fn test_needs_enrichment() {
        let layout = ColumnLayout::default();
        let no_name = RowBuilder::new(2)
            .text(0, "https://shop.com/p/1")
            .number(2, 10.0)
            .build();
        assert!(needs_enrichment(&no_name, &layout));

        let no_price = RowBuilder::new(2)
            .text(0, "http://shop.com/p/1")
            .text(1, "Сетка")
            .build();
        assert!(needs_enrichment(&no_price, &layout));
    }
}
