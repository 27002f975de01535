use std::io::Cursor;
use std::str::FromStr;

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use rust_decimal::Decimal;

use crate::constants::{COLUMN_CODE, COLUMN_NAME, COLUMN_PRICE};
use crate::error::ParseError;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Строка прайса "как есть": любое из полей может отсутствовать
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub code: Option<String>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
}

/// Формат входных байт
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Xlsx,
    Csv,
}

impl TableFormat {
    /// xlsx — это zip-архив, всё остальное читаем как CSV
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) {
            TableFormat::Xlsx
        } else {
            TableFormat::Csv
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

/// Разбирает байты прайса (xlsx или CSV) в строки.
///
/// Первая строка — заголовок, в нём должны быть колонки `Код`,
/// `Номенклатура` и `Цена` (порядок любой, лишние колонки игнорируются).
pub fn read_table(bytes: &[u8]) -> Result<Vec<RawRow>, ParseError> {
    if bytes.is_empty() {
        return Err(ParseError::Empty);
    }

    let grid = match TableFormat::detect(bytes) {
        TableFormat::Xlsx => read_xlsx(bytes)?,
        TableFormat::Csv => read_csv(bytes)?,
    };

    let mut it = grid.into_iter();
    let header = it.next().ok_or(ParseError::Empty)?;
    let columns = Columns::locate(&header)?;

    it.enumerate()
        .map(|(i, cells)| columns.extract(&cells, i + 2))
        .collect()
}

struct Columns {
    code: usize,
    name: usize,
    price: usize,
}

impl Columns {
    fn locate(header: &[Cell]) -> Result<Self, ParseError> {
        let find = |title: &'static str| {
            header
                .iter()
                .position(|c| matches!(c, Cell::Text(t) if t.trim() == title))
                .ok_or(ParseError::MissingColumn(title))
        };

        Ok(Self {
            code: find(COLUMN_CODE)?,
            name: find(COLUMN_NAME)?,
            price: find(COLUMN_PRICE)?,
        })
    }

    // row_no — номер строки как в редакторе таблиц (заголовок = 1)
    fn extract(&self, cells: &[Cell], row_no: usize) -> Result<RawRow, ParseError> {
        let cell = |i: usize| cells.get(i).unwrap_or(&Cell::Empty);

        Ok(RawRow {
            code: cell_text(cell(self.code)),
            name: cell_text(cell(self.name)),
            price: cell_price(cell(self.price), row_no)?,
        })
    }
}

fn cell_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Empty => None,
        Cell::Text(s) => Some(s.clone()),
        Cell::Number(n) => Some(format_number(*n)),
    }
}

// 123.0 -> "123": коды часто хранятся в ячейках как числа
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn cell_price(cell: &Cell, row_no: usize) -> Result<Option<Decimal>, ParseError> {
    let raw = match cell {
        Cell::Empty => return Ok(None),
        Cell::Number(n) => n.to_string(),
        Cell::Text(s) => {
            let s: String = s
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            if s.is_empty() {
                return Ok(None);
            }
            s
        }
    };

    Decimal::from_str(&raw)
        .map(Some)
        .map_err(|_| ParseError::InvalidPrice {
            row: row_no,
            value: raw,
        })
}

fn read_xlsx(bytes: &[u8]) -> Result<Vec<Vec<Cell>>, ParseError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::NoWorksheet)??;

    let grid = range
        .rows()
        .map(|row| row.iter().map(xlsx_cell).collect())
        .collect();

    Ok(grid)
}

fn xlsx_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => text_cell(s),
        other => text_cell(&other.to_string()),
    }
}

fn read_csv(bytes: &[u8]) -> Result<Vec<Vec<Cell>>, ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(detect_delimiter(bytes))
        .from_reader(bytes);

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(text_cell).collect());
    }

    Ok(grid)
}

// по первой строке: прайсы из русской локали обычно через ';'
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    if first_line.contains(&b';') { b';' } else { b',' }
}

fn text_cell(s: &str) -> Cell {
    if s.trim().is_empty() {
        Cell::Empty
    } else {
        Cell::Text(s.to_string())
    }
}
