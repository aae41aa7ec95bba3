use serde::{Deserialize, Serialize};

/// Маркер "нет фото" для карточки товара
pub const PLACEHOLDER_IMAGE: &str = "📦";

/// Публичный префикс, под которым раздаются локальные фотографии
pub const IMAGES_PUBLIC_PREFIX: &str = "/images/";

/// Приоритет по умолчанию (товары без приоритета идут в конец каталога)
pub const DEFAULT_PRIORITY: i64 = 999;

// ============================================================================
// Gender
// ============================================================================

/// Пол / целевая аудитория товара
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unisex,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unisex => "Unisex",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Product
// ============================================================================

/// Товар каталога Mini App (одна строка таблицы после нормализации)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Порядковый номер с 1 среди валидных строк в порядке листа.
    /// Назначается загрузчиком до сортировки по приоритету.
    pub id: u32,

    pub name: String,

    /// Цена в рублях, всегда > 0
    pub price: u64,

    /// Цена в евро как она введена в таблице (для справки)
    pub price_eur: Option<f64>,

    /// Главное фото: `/images/<file>` или [`PLACEHOLDER_IMAGE`]
    pub primary_image: String,

    /// Все фото, первое совпадает с `primary_image`
    pub images: Vec<String>,

    /// Ссылки на фото на сайте магазина
    pub photo_urls: Vec<String>,

    pub sizes: Vec<String>,

    /// Группа
    pub category: String,

    /// Подгруппа
    pub subcategory: String,

    /// Категория товара (очки, ракетка, кроссовки...)
    pub product_category: String,

    pub brand: String,

    pub gender: Gender,

    /// Остаток / наличие, свободный текст
    pub balance: String,

    /// Чем меньше, тем выше в каталоге
    pub priority: i64,

    /// Ссылка на страницу товара в магазине
    pub url: String,
}

impl ProductRecord {
    /// Есть ли у товара настоящее фото (а не заглушка)
    pub fn has_photo(&self) -> bool {
        self.primary_image.starts_with(IMAGES_PUBLIC_PREFIX)
    }
}
