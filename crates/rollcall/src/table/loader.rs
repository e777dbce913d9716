//! Loader backends: spreadsheet, CSV, JSON and recognized-text sources
//! all funnel into the same [`Table`] shape.
//!
//! Loading never mutates the source file.

use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::ExtractError;

use super::header::infer_header_row;
use super::{grid, CellValue, Table};

/// Loads a file into a [`Table`].
///
/// `header_row` is the row index declared by the configuration. When it
/// is absent or left at the default row 0, header inference runs
/// instead; `expected_columns` feeds the inference as a strong hint.
pub fn load_table(
    path: &Path,
    header_row: Option<usize>,
    expected_columns: &[String],
) -> Result<Table, ExtractError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| ExtractError::UnsupportedFormat(path.display().to_string()))?;

    let table = match extension.as_str() {
        "xlsx" | "xls" | "xlsm" | "ods" => {
            table_from_rows(load_excel_rows(path)?, header_row, expected_columns)
        }
        "csv" => table_from_rows(load_csv_rows(path)?, header_row, expected_columns),
        "json" => load_json_table(path)?,
        // Everything else is treated as recognized text and handed to
        // the lower-confidence grid backend.
        _ => {
            let text = read_lossy(path)?;
            clean_table_labels(grid::table_from_text(&text, path)?)
        }
    };

    tracing::debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.columns().len(),
        "loaded table"
    );

    Ok(table)
}

/// Builds a table from raw rows: picks the header row, normalizes its
/// labels and keeps everything below it as data.
fn table_from_rows(
    rows: Vec<Vec<CellValue>>,
    header_row: Option<usize>,
    expected_columns: &[String],
) -> Table {
    let header_index = match header_row {
        Some(index) if index > 0 => index.min(rows.len().saturating_sub(1)),
        _ => infer_header_row(&rows, expected_columns),
    };

    let columns: Vec<String> = rows
        .get(header_index)
        .map(|row| row.iter().map(|c| clean_label(&c.as_text())).collect())
        .unwrap_or_default();

    let mut table = Table::new(columns);
    for row in rows.into_iter().skip(header_index + 1) {
        table.push_row(row);
    }
    table
}

fn load_excel_rows(path: &Path) -> Result<Vec<Vec<CellValue>>, ExtractError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ExtractError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ExtractError::Spreadsheet("workbook has no sheets".to_string()))?
        .map_err(|e| ExtractError::Spreadsheet(e.to_string()))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(convert_excel_cell).collect())
        .collect())
}

fn convert_excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::from_text(s),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        // Native date cells are rendered as dates, not serial numbers.
        // A midnight timestamp is a date-stamped column header, so the
        // time part is dropped.
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) if naive.time() == chrono::NaiveTime::MIN => {
                CellValue::Text(naive.format("%Y-%m-%d").to_string())
            }
            Some(naive) => CellValue::Text(naive.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Empty,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_text(s),
        Data::Error(_) => CellValue::Empty,
    }
}

fn load_csv_rows(path: &Path) -> Result<Vec<Vec<CellValue>>, ExtractError> {
    // Files arrive in whatever encoding the exporting tool used; a
    // lossy decode keeps the grid usable instead of failing the job.
    let text = read_lossy(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(CellValue::from_text).collect());
    }
    Ok(rows)
}

/// A JSON source is already structured: an array of flat objects whose
/// keys become columns in first-appearance order.
fn load_json_table(path: &Path) -> Result<Table, ExtractError> {
    let text = read_lossy(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;

    let objects = match value {
        serde_json::Value::Array(items) => items,
        _ => {
            return Err(ExtractError::Spreadsheet(
                "JSON source must be an array of objects".to_string(),
            ))
        }
    };

    let mut columns: Vec<String> = Vec::new();
    for item in &objects {
        if let serde_json::Value::Object(map) = item {
            for key in map.keys() {
                let label = clean_label(key);
                if !columns.contains(&label) {
                    columns.push(label);
                }
            }
        }
    }

    let mut table = Table::new(columns);
    for item in &objects {
        if let serde_json::Value::Object(map) = item {
            let row = table
                .columns()
                .iter()
                .map(|label| {
                    map.iter()
                        .find(|(key, _)| clean_label(key) == *label)
                        .map(|(_, v)| convert_json_cell(v))
                        .unwrap_or(CellValue::Empty)
                })
                .collect();
            table.push_row(row);
        }
    }
    Ok(table)
}

fn convert_json_cell(value: &serde_json::Value) -> CellValue {
    match value {
        serde_json::Value::Null => CellValue::Empty,
        serde_json::Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or_default(),
        serde_json::Value::String(s) => CellValue::from_text(s),
        serde_json::Value::Bool(b) => CellValue::Text(b.to_string()),
        other => CellValue::from_text(&other.to_string()),
    }
}

fn read_lossy(path: &Path) -> Result<String, ExtractError> {
    let mut bytes = Vec::new();
    std::fs::File::open(path)
        .and_then(|mut f| f.read_to_end(&mut bytes))
        .map_err(|e| ExtractError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Normalizes a column label: embedded newlines collapse to spaces and
/// a trailing midnight timestamp is stripped, so a column literally
/// named `2025-11-01 00:00:00` becomes `2025-11-01`. Surrounding
/// whitespace is kept; exact matching is the resolver's concern.
fn clean_label(raw: &str) -> String {
    let label = raw.replace(['\n', '\r'], " ");
    match label.trim_end().strip_suffix(" 00:00:00") {
        Some(stripped) => stripped.to_string(),
        None => label,
    }
}

fn clean_table_labels(table: Table) -> Table {
    let columns = table.columns().iter().map(|c| clean_label(c)).collect();
    let mut cleaned = Table::new(columns);
    for row in table.rows() {
        cleaned.push_row(row.clone());
    }
    cleaned
}
