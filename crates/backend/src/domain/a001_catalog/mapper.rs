use contracts::domain::a001_catalog::{ProductRecord, RejectionKind};
use thiserror::Error;

use super::gender::GenderNormalizer;
use super::images::build_image_list;
use super::price::resolve_row_price;
use super::sizes::{parse_sizes, split_unique};
use crate::shared::config::{CatalogConfig, ColumnLayout, GenderConfig};
use crate::shared::excel::{CellValue, RawRow};

/// Почему строка не стала товаром
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RowRejection {
    #[error("name is blank")]
    MissingName,

    #[error("no positive price in candidate columns")]
    MissingPrice,
}

impl RowRejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            RowRejection::MissingName => RejectionKind::MissingName,
            RowRejection::MissingPrice => RejectionKind::MissingPrice,
        }
    }
}

/// Превращает строку таблицы в товар.
///
/// Чистая функция от строки: без I/O и скрытого состояния. Отклоняет строку
/// только без названия или без цены, остальные поля получают значения
/// по умолчанию. `id` остается нулевым, его назначает загрузчик каталога.
#[derive(Debug, Clone)]
pub struct ProductMapper {
    layout: ColumnLayout,
    gender: GenderNormalizer,
    placeholder: String,
    default_priority: i64,
}

impl ProductMapper {
    pub fn new(layout: ColumnLayout, gender: &GenderConfig, catalog: &CatalogConfig) -> Self {
        Self {
            layout,
            gender: GenderNormalizer::new(gender),
            placeholder: catalog.placeholder.clone(),
            default_priority: catalog.default_priority,
        }
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn map_row(&self, row: &RawRow) -> Result<ProductRecord, RowRejection> {
        let layout = &self.layout;

        let name = row
            .get(layout.name)
            .as_text()
            .ok_or(RowRejection::MissingName)?;
        let price =
            resolve_row_price(row, &layout.price_candidates).ok_or(RowRejection::MissingPrice)?;

        let text = |column: usize| row.get(column).as_text();
        let images = build_image_list(text(layout.local_images).as_deref(), &self.placeholder);

        Ok(ProductRecord {
            id: 0,
            name,
            price,
            price_eur: row.get(layout.price_eur).as_number().filter(|p| *p > 0.0),
            primary_image: images.primary,
            images: images.images,
            photo_urls: split_unique(text(layout.photo_urls).as_deref()),
            sizes: parse_sizes(text(layout.sizes).as_deref()),
            category: text(layout.group).unwrap_or_default(),
            subcategory: text(layout.subgroup).unwrap_or_default(),
            product_category: text(layout.product_category).unwrap_or_default(),
            brand: text(layout.brand).unwrap_or_default(),
            gender: self.gender.normalize(text(layout.gender).as_deref()),
            balance: text(layout.balance).unwrap_or_default(),
            priority: self.priority(row.get(layout.priority)),
            url: text(layout.url).unwrap_or_default(),
        })
    }

    fn priority(&self, cell: &CellValue) -> i64 {
        cell.as_number()
            .map(f64::round)
            .filter(|p| p.abs() < i64::MAX as f64)
            .map(|p| p as i64)
            .unwrap_or(self.default_priority)
    }
}

impl Default for ProductMapper {
    fn default() -> Self {
        Self::new(
            ColumnLayout::default(),
            &GenderConfig::default(),
            &CatalogConfig::default(),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use contracts::domain::a001_catalog::{Gender, DEFAULT_PRIORITY, PLACEHOLDER_IMAGE};

    /// Строка в раскладке по умолчанию
    pub(crate) struct RowBuilder {
        row: RawRow,
    }

    impl RowBuilder {
        pub(crate) fn new(row_number: u32) -> Self {
            Self {
                row: RawRow::new(row_number, Vec::new()),
            }
        }

        pub(crate) fn text(mut self, column: usize, value: &str) -> Self {
            self.row.set(column, CellValue::Text(value.to_string()));
            self
        }

        pub(crate) fn number(mut self, column: usize, value: f64) -> Self {
            self.row.set(column, CellValue::Number(value));
            self
        }

        pub(crate) fn build(self) -> RawRow {
            self.row
        }
    }

    /// Полностью заполненная валидная строка
    pub(crate) fn valid_row(row_number: u32, name: &str, price_rub: f64) -> RawRow {
        let layout = ColumnLayout::default();
        RowBuilder::new(row_number)
            .text(layout.url, "https://www.tradeinn.com/volleyball/ru/asics/139269743/p")
            .text(layout.name, name)
            .number(layout.price_eur, 99.0)
            .text(layout.group, "Волейбол")
            .text(layout.subgroup, "Обувь")
            .text(layout.product_category, "Кроссовки")
            .text(layout.local_images, "images\\product_1.webp, images/product_1_2.webp")
            .text(layout.sizes, "40, 41, 42")
            .text(layout.brand, "Asics")
            .text(layout.gender, "Мужские")
            .text(layout.balance, "в наличии")
            .number(15, price_rub)
            .build()
    }

    #[test]
    fn test_maps_full_row() {
        let mapper = ProductMapper::default();
        let product = mapper.map_row(&valid_row(2, "Asics Gel Tactic 2", 12499.7)).unwrap();

        assert_eq!(product.id, 0);
        assert_eq!(product.name, "Asics Gel Tactic 2");
        assert_eq!(product.price, 12500);
        assert_eq!(product.price_eur, Some(99.0));
        assert_eq!(product.primary_image, "/images/product_1.webp");
        assert_eq!(product.images.len(), 2);
        assert_eq!(product.sizes, vec!["40", "41", "42"]);
        assert_eq!(product.category, "Волейбол");
        assert_eq!(product.subcategory, "Обувь");
        assert_eq!(product.product_category, "Кроссовки");
        assert_eq!(product.brand, "Asics");
        assert_eq!(product.gender, Gender::Male);
        assert_eq!(product.balance, "в наличии");
        assert_eq!(product.priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn test_blank_name_rejected_regardless_of_other_fields() {
        let mapper = ProductMapper::default();
        let layout = ColumnLayout::default();
        for name in ["", "   ", "\t"] {
            let mut row = valid_row(3, "x", 1000.0);
            row.set(layout.name, CellValue::Text(name.into()));
            assert_eq!(mapper.map_row(&row), Err(RowRejection::MissingName));
        }

        let mut row = valid_row(3, "x", 1000.0);
        row.set(layout.name, CellValue::Empty);
        assert_eq!(mapper.map_row(&row), Err(RowRejection::MissingName));
    }

    #[test]
    fn test_name_checked_before_price() {
        let mapper = ProductMapper::default();
        let row = RowBuilder::new(2).build();
        assert_eq!(mapper.map_row(&row), Err(RowRejection::MissingName));
    }

    #[test]
    fn test_no_price_rejected() {
        let mapper = ProductMapper::default();
        let row = RowBuilder::new(4)
            .text(1, "Кепка")
            .number(15, 0.0)
            .number(23, -5.0)
            .build();
        assert_eq!(mapper.map_row(&row), Err(RowRejection::MissingPrice));
        assert_eq!(
            mapper.map_row(&row).unwrap_err().kind(),
            RejectionKind::MissingPrice
        );
    }

    #[test]
    fn test_minimal_row_gets_defaults() {
        let mapper = ProductMapper::default();
        let row = RowBuilder::new(7).text(1, "  Рюкзак Urban ").number(2, 28.0).build();
        let product = mapper.map_row(&row).unwrap();

        assert_eq!(product.name, "Рюкзак Urban");
        assert_eq!(product.price, 28);
        assert_eq!(product.images, vec![PLACEHOLDER_IMAGE]);
        assert_eq!(product.primary_image, PLACEHOLDER_IMAGE);
        assert!(product.sizes.is_empty());
        assert_eq!(product.brand, "");
        assert_eq!(product.gender, Gender::Unisex);
        assert_eq!(product.priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn test_priority_parsing() {
        let mapper = ProductMapper::default();
        let base = || RowBuilder::new(2).text(1, "Очки").number(2, 10.0);

        let row = base().number(22, 3.0).build();
        assert_eq!(mapper.map_row(&row).unwrap().priority, 3);

        let row = base().text(22, " 1 ").build();
        assert_eq!(mapper.map_row(&row).unwrap().priority, 1);

        let row = base().text(22, "высокий").build();
        assert_eq!(mapper.map_row(&row).unwrap().priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn test_numeric_brand_rendered_without_fraction() {
        let mapper = ProductMapper::default();
        let row = RowBuilder::new(2)
            .text(1, "Шлем")
            .number(2, 50.0)
            .number(19, 361.0)
            .build();
        assert_eq!(mapper.map_row(&row).unwrap().brand, "361");
    }

    #[test]
    fn test_same_row_same_result() {
        let mapper = ProductMapper::default();
        let row = valid_row(5, "Ракетка", 20000.0);
        assert_eq!(mapper.map_row(&row), mapper.map_row(&row));
    }
}
