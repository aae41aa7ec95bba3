use std::collections::HashSet;

/// Разбирает ячейку "Размеры" в список.
///
/// Делим по запятой, обрезаем пробелы, пустые куски выкидываем, повторы
/// убираем (с учетом регистра), порядок - по первому вхождению. Сортировку
/// не делаем: "XL" и "42 1/2" сортирует витрина, если ей нужно.
pub fn parse_sizes(raw: Option<&str>) -> Vec<String> {
    split_unique(raw)
}

/// Список через запятую без пустых элементов и повторов
pub fn split_unique(raw: Option<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}
