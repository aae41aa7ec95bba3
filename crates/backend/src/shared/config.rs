use serde::Deserialize;
use std::path::{Path, PathBuf};

use contracts::domain::a001_catalog::{DEFAULT_PRIORITY, PLACEHOLDER_IMAGE};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub layout: ColumnLayout,
    pub gender: GenderConfig,
    pub scrape: ScrapeConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Максимальный размер загружаемого архива (МБ)
    pub upload_limit_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            upload_limit_mb: 200,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    /// Таблица с товарами
    pub source: String,
    /// Папка с фотографиями (раздается как /images/)
    pub images_dir: String,
    /// Лист таблицы; по умолчанию первый
    pub sheet: Option<String>,
    pub placeholder: String,
    pub default_priority: i64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: "data/products_links.xlsx".into(),
            images_dir: "data/images".into(),
            sheet: None,
            placeholder: PLACEHOLDER_IMAGE.into(),
            default_priority: DEFAULT_PRIORITY,
        }
    }
}

/// Раскладка колонок таблицы (индексы с нуля: A = 0, B = 1, ...)
///
/// Порядок колонок - контракт с шаблоном таблицы, поэтому он вынесен в
/// конфигурацию, а не зашит в код.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ColumnLayout {
    pub url: usize,
    pub name: usize,
    pub price_eur: usize,
    pub group: usize,
    pub subgroup: usize,
    pub product_category: usize,
    pub photo_urls: usize,
    pub local_images: usize,
    pub sizes: usize,
    pub brand: usize,
    pub gender: usize,
    pub balance: usize,
    pub priority: usize,
    /// Кандидаты цены в порядке приоритета
    pub price_candidates: Vec<usize>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            url: 0,               // A: URL товара
            name: 1,              // B: Название
            price_eur: 2,         // C: Цена (€)
            group: 3,             // D: Группа
            subgroup: 4,          // E: Подгруппа
            product_category: 5,  // F: Категория товара
            photo_urls: 6,        // G: URL фото
            local_images: 7,      // H: Локальное фото
            sizes: 8,             // I: Размеры
            brand: 19,            // T: Бренд
            gender: 20,           // U: Пол
            balance: 21,          // V: Остаток
            priority: 22,         // W: Приоритет
            // P: Цена с дост. (₽) - формула, X: цена вручную, C: цена в евро
            price_candidates: vec![15, 23, 2],
        }
    }
}

impl ColumnLayout {
    /// Сколько колонок нужно прочитать, чтобы покрыть все поля
    pub fn width(&self) -> usize {
        [
            self.url,
            self.name,
            self.price_eur,
            self.group,
            self.subgroup,
            self.product_category,
            self.photo_urls,
            self.local_images,
            self.sizes,
            self.brand,
            self.gender,
            self.balance,
            self.priority,
        ]
        .into_iter()
        .chain(self.price_candidates.iter().copied())
        .max()
        .unwrap_or(0)
            + 1
    }
}

/// Синонимы для нормализации пола (сравнение по подстроке, без учета регистра)
///
/// Порядок проверки фиксирован: unisex, female, male. Женские синонимы
/// проверяются раньше мужских, потому что "female" содержит "male",
/// а "women" содержит "men".
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GenderConfig {
    pub unisex: Vec<String>,
    pub female: Vec<String>,
    pub male: Vec<String>,
}

impl Default for GenderConfig {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            unisex: list(&["унисекс", "unisex"]),
            female: list(&["жен", "female", "women", "woman", "girl", "дев"]),
            male: list(&["муж", "male", "men", "man", "boy", "мальч"]),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Дозаполнять пустые строки данными со страницы товара
    pub enabled: bool,
    pub timeout_secs: u64,
    /// Пауза между запросами, чтобы магазин не забанил
    pub delay_ms: u64,
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_secs: 10,
            delay_ms: 2000,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
                .into(),
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 8080

[catalog]
source = "data/products_links.xlsx"
images_dir = "data/images"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Current working directory
/// 3. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    let mut candidates = Vec::new();
    if let Some(exe_dir) = exe_dir() {
        candidates.push(exe_dir.join("config.toml"));
    }
    candidates.push(PathBuf::from("config.toml"));

    for config_path in candidates {
        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            let contents = std::fs::read_to_string(&config_path)?;
            return parse_config(&contents);
        }
        tracing::warn!("config.toml not found at: {}", config_path.display());
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if config.layout.price_candidates.is_empty() {
        anyhow::bail!("layout.price_candidates must list at least one column");
    }
    Ok(config)
}

/// Resolves relative paths relative to the executable directory
pub fn resolve_path(path_str: &str) -> PathBuf {
    let path = Path::new(path_str);

    if path.is_absolute() {
        return path.to_path_buf();
    }

    match exe_dir() {
        Some(dir) => dir.join(path),
        None => PathBuf::from(path_str),
    }
}

fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}
