use crate::shared::excel::{CellValue, RawRow};

/// Выбирает цену из кандидатов в порядке приоритета.
///
/// Берется первый кандидат, который является числом (или числовым текстом)
/// и после округления до рубля строго больше нуля. Если ни один не подошел,
/// возвращается `None` - это не цена 0, а отсутствие цены.
pub fn resolve_price<'a, I>(candidates: I) -> Option<u64>
where
    I: IntoIterator<Item = &'a CellValue>,
{
    candidates.into_iter().find_map(qualify)
}

/// Цена строки по колонкам-кандидатам из раскладки
pub fn resolve_row_price(row: &RawRow, columns: &[usize]) -> Option<u64> {
    resolve_price(columns.iter().map(|&col| row.get(col)))
}

fn qualify(cell: &CellValue) -> Option<u64> {
    let value = cell.as_number()?;
    if value <= 0.0 {
        return None;
    }
    let rounded = value.round();
    // 0.3 ₽ округляется в ноль - такой кандидат не годится
    (rounded >= 1.0).then_some(rounded as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    #[test]
    fn test_first_candidate_wins() {
        let cells = [num(100.0), num(200.0), num(5.0)];
        assert_eq!(resolve_price(&cells), Some(100));
    }

    #[test]
    fn test_skips_empty_cached_value() {
        let cells = [CellValue::Empty, num(200.0), num(5.0)];
        assert_eq!(resolve_price(&cells), Some(200));
    }

    #[test]
    fn test_zero_and_empty_fall_through_to_alt_currency() {
        let cells = [num(0.0), CellValue::Empty, num(5.0)];
        assert_eq!(resolve_price(&cells), Some(5));
    }

    #[test]
    fn test_no_qualifying_candidate() {
        let cells = [num(0.0), num(-10.0), CellValue::Empty];
        assert_eq!(resolve_price(&cells), None);
        let none: [CellValue; 0] = [];
        assert_eq!(resolve_price(&none), None);
    }

    #[test]
    fn test_rounds_to_integer() {
        assert_eq!(resolve_price(&[num(14999.6)]), Some(15000));
        assert_eq!(resolve_price(&[num(99.4)]), Some(99));
    }

    #[test]
    fn test_fraction_rounding_to_zero_does_not_qualify() {
        let cells = [num(0.3), num(7.0)];
        assert_eq!(resolve_price(&cells), Some(7));
    }

    #[test]
    fn test_numeric_text_and_garbage() {
        let cells = [
            CellValue::Text("по запросу".into()),
            CellValue::Text("5309,00".into()),
        ];
        assert_eq!(resolve_price(&cells), Some(5309));
    }

    #[test]
    fn test_thousands_comma_falls_through_to_next_candidate() {
        let cells = [CellValue::Text("1,500".into()), num(1500.0)];
        assert_eq!(resolve_price(&cells), Some(1500));
        let cells = [CellValue::Text("1,500".into()), CellValue::Empty];
        assert_eq!(resolve_price(&cells), None);
    }

    #[test]
    fn test_row_columns_in_priority_order() {
        let row = RawRow::new(2, vec![CellValue::Empty, num(10.0), num(20.0)]);
        assert_eq!(resolve_row_price(&row, &[2, 1]), Some(20));
        assert_eq!(resolve_row_price(&row, &[0, 1]), Some(10));
        // колонка за пределами строки считается пустой
        assert_eq!(resolve_row_price(&row, &[40]), None);
    }
}
