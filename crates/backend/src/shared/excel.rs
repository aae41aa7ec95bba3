//! Чтение строк таблицы в типизированные ячейки.
//!
//! Ячейка xlsx может оказаться числом, текстом или пустотой в зависимости от
//! того, как файл был сохранен в последний раз. Дальше по конвейеру все
//! работают только с [`CellValue`] и явно разбирают варианты.

use calamine::{Data, DataType, Range};

/// Значение одной ячейки как оно хранится в файле
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    pub fn from_data(data: &Data) -> Self {
        match data {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            // #N/A, #REF! и т.п. - формула не посчиталась
            Data::Error(_) => CellValue::Empty,
            Data::Empty => CellValue::Empty,
        }
    }

    /// Пустая ячейка или текст из одних пробелов
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Текстовое представление без пробелов по краям; `None` для пустых ячеек.
    /// Целые числа выводятся без ".0" (бренд или размер, набранный числом).
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            CellValue::Number(n) => Some(format_number(*n)),
        }
    }

    /// Число из ячейки: само число или текст, похожий на число ("1 500", "5309,00")
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            CellValue::Empty => return None,
            CellValue::Number(n) => *n,
            CellValue::Text(s) => parse_number(s)?,
        };
        value.is_finite().then_some(value)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Число из текста ячейки. Запятая считается десятичным разделителем,
/// только если она единственная и после неё одна или две цифры
/// ("5309,00"). Строки вроде "1,500" или "1.500,00" неоднозначны и дают `None`.
fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .trim_end_matches(['₽', '€'])
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let separators = cleaned.matches([',', '.']).count();
    match cleaned.split_once(',') {
        Some((int, frac)) => {
            let decimal = separators == 1
                && (1..=2).contains(&frac.len())
                && frac.chars().all(|c| c.is_ascii_digit());
            if !decimal {
                return None;
            }
            format!("{int}.{frac}").parse().ok()
        }
        None => cleaned.parse().ok(),
    }
}

/// Одна строка данных таблицы
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// Номер строки в таблице (с единицы, как в Excel)
    pub row_number: u32,
    cells: Vec<CellValue>,
}

impl RawRow {
    pub fn new(row_number: u32, cells: Vec<CellValue>) -> Self {
        Self { row_number, cells }
    }

    /// Ячейка по индексу колонки; за пределами строки - пустая
    pub fn get(&self, column: usize) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }

    pub fn set(&mut self, column: usize, value: CellValue) {
        if column >= self.cells.len() {
            self.cells.resize(column + 1, CellValue::Empty);
        }
        self.cells[column] = value;
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_blank)
    }
}

/// Заголовок занимает первую строку листа
pub const HEADER_ROWS: u32 = 1;

/// Читает строку `row_number` (с единицы) из листа, первые `width` колонок.
/// Отсутствующие ячейки становятся [`CellValue::Empty`].
pub fn extract_row(range: &Range<Data>, row_number: u32, width: usize) -> RawRow {
    let row_index = row_number.saturating_sub(1);
    let cells = (0..width)
        .map(|col| {
            range
                .get_value((row_index, col as u32))
                .filter(|data| !data.is_empty())
                .map(CellValue::from_data)
                .unwrap_or(CellValue::Empty)
        })
        .collect();
    RawRow::new(row_number, cells)
}

/// Все строки данных листа: со второй до последней заполненной
pub fn data_rows(range: &Range<Data>, width: usize) -> Vec<RawRow> {
    let Some((last_row, _)) = range.end() else {
        return Vec::new();
    };

    (HEADER_ROWS + 1..=last_row + 1)
        .map(|row_number| extract_row(range, row_number, width))
        .collect()
}
