use contracts::domain::a001_catalog::{Gender, ProductRecord, DEFAULT_PRIORITY};
use once_cell::sync::Lazy;

/// Встроенный каталог: показывается, когда таблицы нет или ее не удалось прочитать
static DEFAULT_CATALOG: Lazy<Vec<ProductRecord>> = Lazy::new(|| {
    [
        ("Футболка Premium", 1500, "👕"),
        ("Кроссовки Sport", 4500, "👟"),
        ("Рюкзак Urban", 2800, "🎒"),
        ("Наушники Pro", 6000, "🎧"),
        ("Смарт-часы", 8500, "⌚"),
        ("Кепка Classic", 900, "🧢"),
    ]
    .into_iter()
    .enumerate()
    .map(|(idx, (name, price, emoji))| ProductRecord {
        id: idx as u32 + 1,
        name: name.to_string(),
        price,
        price_eur: None,
        primary_image: emoji.to_string(),
        images: vec![emoji.to_string()],
        photo_urls: Vec::new(),
        sizes: Vec::new(),
        category: String::new(),
        subcategory: String::new(),
        product_category: String::new(),
        brand: String::new(),
        gender: Gender::Unisex,
        balance: String::new(),
        priority: DEFAULT_PRIORITY,
        url: String::new(),
    })
    .collect()
});

pub fn default_catalog() -> Vec<ProductRecord> {
    DEFAULT_CATALOG.clone()
}
