//! Generic 2-D table model shared by every loader backend.
//!
//! Column labels are whatever the source file contained, never assumed
//! unique or clean. Fuzzy matching against them is the column resolver's
//! job (`crate::columns`), not the table's.

pub mod grid;
pub mod header;
pub mod loader;

pub use loader::load_table;

use serde_json::{Map, Number, Value};

/// A loosely typed cell as read from a spreadsheet, CSV or OCR grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Builds a cell from raw text, collapsing blanks and the common
    /// spreadsheet "nothing" spellings to `Empty`.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
            CellValue::Empty
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Numeric coercion: numbers pass through, text is parsed if it
    /// looks like a number. Returns `None` otherwise.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Empty => None,
        }
    }

    /// True when the cell holds a number or text that parses as one.
    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }

    /// Display form. Whole numbers render without a trailing `.0` so a
    /// day count of `2.0` reads back as `"2"`.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
        }
    }

    fn to_json(&self) -> Value {
        match self {
            CellValue::Empty => Value::Null,
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Number(n) => Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

/// An ordered set of named columns and ordered rows.
///
/// Row order is preserved from the source and no column is dropped
/// before interpretation.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    /// Index of a column by its exact label.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }

    /// Replaces a single cell. Out-of-bounds writes are ignored; the
    /// business-rule transformer only writes to resolved columns.
    pub fn set_cell(&mut self, row: usize, column: usize, value: CellValue) {
        if let Some(r) = self.rows.get_mut(row) {
            if let Some(c) = r.get_mut(column) {
                *c = value;
            }
        }
    }

    /// Dumps the table as a plain array of flat objects, one per row,
    /// keyed by column label. This is the persisted "raw" document
    /// shape.
    pub fn to_json_rows(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut object = Map::new();
                for (label, cell) in self.columns.iter().zip(row.iter()) {
                    object.insert(label.clone(), cell.to_json());
                }
                Value::Object(object)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut t = Table::new(vec!["Code".into(), "1".into(), "2".into()]);
        t.push_row(vec![
            CellValue::Text("E-1".into()),
            CellValue::Text("A".into()),
            CellValue::Empty,
        ]);
        t.push_row(vec![CellValue::Text("E-2".into())]);
        t
    }

    #[test]
    fn push_row_pads_to_width() {
        let t = sample();
        assert_eq!(t.rows()[1].len(), 3);
        assert!(t.cell(1, 2).is_empty());
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(CellValue::Text(" 4 ".into()).as_number(), Some(4.0));
        assert_eq!(CellValue::Number(2.5).as_number(), Some(2.5));
        assert_eq!(CellValue::Text("P".into()).as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
    }

    #[test]
    fn nan_text_is_empty() {
        assert!(CellValue::from_text("NaN").is_empty());
        assert!(CellValue::from_text("  ").is_empty());
        assert!(!CellValue::from_text("0").is_empty());
    }

    #[test]
    fn whole_numbers_render_without_fraction() {
        assert_eq!(CellValue::Number(2.0).as_text(), "2");
        assert_eq!(CellValue::Number(2.5).as_text(), "2.5");
    }

    #[test]
    fn json_rows_keep_column_order_and_nulls() {
        let rows = sample().to_json_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Code"], "E-1");
        assert!(rows[0]["2"].is_null());
    }
}
