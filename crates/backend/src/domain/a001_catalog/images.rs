use contracts::domain::a001_catalog::IMAGES_PUBLIC_PREFIX;

/// Фотографии товара для карточки
#[derive(Debug, Clone, PartialEq)]
pub struct ImageList {
    pub primary: String,
    /// Никогда не пустой: как минимум заглушка
    pub images: Vec<String>,
}

/// Префиксы папки с фото, которые парсер пишет в таблицу
/// (на Windows - через обратный слэш)
const LOCAL_PREFIXES: [&str; 2] = ["images/", "images\\"];

/// Строит список фото из ячейки "Локальное фото".
///
/// Ячейка содержит пути через запятую, например `images\a.jpg, images/b.jpg`.
/// Каждый путь очищается от префикса папки и получает публичный префикс
/// `/images/`. Если путей нет, в списке остается только `placeholder`.
pub fn build_image_list(raw: Option<&str>, placeholder: &str) -> ImageList {
    let images: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .filter_map(public_path)
        .collect();

    match images.first() {
        Some(first) => ImageList {
            primary: first.clone(),
            images,
        },
        None => ImageList {
            primary: placeholder.to_string(),
            images: vec![placeholder.to_string()],
        },
    }
}

fn public_path(fragment: &str) -> Option<String> {
    let file = LOCAL_PREFIXES
        .iter()
        .find_map(|prefix| fragment.strip_prefix(prefix))
        .unwrap_or(fragment)
        .replace('\\', "/");
    let file = file.trim_start_matches('/');
    if file.is_empty() {
        return None;
    }
    Some(format!("{IMAGES_PUBLIC_PREFIX}{file}"))
}
