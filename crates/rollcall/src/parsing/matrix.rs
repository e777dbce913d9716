//! MATRIX layout: one row per employee, one column per calendar day.

use chrono::NaiveDate;

use crate::error::ExtractError;
use crate::mapping::CodeMapping;
use crate::table::Table;

use super::{
    days_in_month, normalize_employee_code, resolve_employee_columns, AttendanceRecord,
    ParsingConfig,
};

pub fn interpret(
    table: &Table,
    config: &ParsingConfig,
    year: i32,
    month: u32,
    mapping: &CodeMapping,
) -> Result<Vec<AttendanceRecord>, ExtractError> {
    let (code_index, name_index) = resolve_employee_columns(table, config)?;

    let start_logical = config
        .day_start_column
        .as_deref()
        .ok_or_else(|| ExtractError::InvalidConfig("MATRIX mode requires day_start_column".into()))?;
    let end_logical = config
        .day_end_column
        .as_deref()
        .ok_or_else(|| ExtractError::InvalidConfig("MATRIX mode requires day_end_column".into()))?;

    let start_index = find_boundary(table, start_logical)?;
    let end_index = find_boundary(table, end_logical)?;
    // The window is inclusive and follows table order.
    let (start_index, end_index) = if start_index <= end_index {
        (start_index, end_index)
    } else {
        (end_index, start_index)
    };

    let last_day = days_in_month(year, month)?;
    let mut records = Vec::new();

    for row in 0..table.row_count() {
        let code_cell = table.cell(row, code_index).as_text();
        if code_cell.trim().is_empty() {
            continue;
        }
        let employee = normalize_employee_code(&code_cell);
        let employee_name = display_name(table, row, name_index, &employee);

        for column in start_index..=end_index {
            let Some(day) = parse_day_number(&table.columns()[column]) else {
                continue;
            };
            if day == 0 || day > 31 {
                continue;
            }

            let token = table.cell(row, column).as_text().trim().to_uppercase();
            if token.is_empty() {
                continue;
            }

            let Some(status) = mapping.actionable_status(&token) else {
                continue;
            };

            // Day 31 in a 30-day month drops the record, it never errors.
            if day > last_day {
                tracing::debug!(employee = %employee, day, "day outside target month, dropped");
                continue;
            }
            let Some(attendance_date) = NaiveDate::from_ymd_opt(year, month, day) else {
                continue;
            };

            records.push(AttendanceRecord {
                employee: employee.clone(),
                employee_name: employee_name.clone(),
                attendance_date,
                status: status.to_string(),
            });
        }
    }

    Ok(records)
}

fn display_name(table: &Table, row: usize, name_index: Option<usize>, fallback: &str) -> String {
    name_index
        .map(|index| table.cell(row, index).as_text().trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Locates a day-window boundary column by literal match first, then by
/// prefix, so `"2025-11-01"` also matches a label that kept a time
/// suffix or annotation.
fn find_boundary(table: &Table, logical: &str) -> Result<usize, ExtractError> {
    let target = logical.trim().to_lowercase();

    let literal = table
        .columns()
        .iter()
        .position(|label| label.trim().to_lowercase() == target);
    if let Some(index) = literal {
        return Ok(index);
    }

    table
        .columns()
        .iter()
        .position(|label| label.trim().to_lowercase().starts_with(&target))
        .ok_or_else(|| ExtractError::ColumnNotFound {
            logical: logical.to_string(),
            available: table.columns().to_vec(),
        })
}

/// Extracts a day number from a day-column label. Supported forms:
/// `2025-11-05`, `05/11/2025` (day first), and bare `5`.
fn parse_day_number(label: &str) -> Option<u32> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    if let Ok(day) = label.parse::<u32>() {
        return Some(day);
    }

    if label.contains('-') {
        // YYYY-MM-DD: the day is the third segment.
        return label
            .split('-')
            .nth(2)
            .and_then(|segment| segment.trim().parse::<u32>().ok());
    }

    if label.contains('/') {
        // DD/MM/YYYY: the day is the first segment.
        return label
            .split('/')
            .next()
            .and_then(|segment| segment.trim().parse::<u32>().ok());
    }

    None
}
