//! SUMMARY layout: one row per employee, one column per status total.
//!
//! The source carries no per-day granularity, so consumed days are
//! assigned sequentially from day 1 of the target month. A leave
//! recorded here as "day 3" may have occurred on any day; this is a
//! known modeling approximation kept for compatibility with the
//! upstream behavior, not a calendar claim.

use chrono::NaiveDate;

use crate::error::ExtractError;
use crate::mapping::CodeMapping;
use crate::table::Table;

use super::{
    days_in_month, normalize_employee_code, resolve_employee_columns, resolve_required,
    AttendanceRecord, ParsingConfig,
};

/// The `mapping` profile is not consulted here: SUMMARY columns are
/// configured directly against canonical statuses, unlike MATRIX cells
/// which carry organization-specific codes.
pub fn interpret(
    table: &Table,
    config: &ParsingConfig,
    year: i32,
    month: u32,
    _mapping: &CodeMapping,
) -> Result<Vec<AttendanceRecord>, ExtractError> {
    let (code_index, name_index) = resolve_employee_columns(table, config)?;

    // Resolve every configured count column up front so a bad
    // configuration fails the job before any record is emitted.
    let mut status_indices: Vec<(&str, usize)> = Vec::with_capacity(config.status_columns.len());
    for status_column in &config.status_columns {
        let index = resolve_required(table, &status_column.column)?;
        status_indices.push((status_column.status.as_str(), index));
    }

    let last_day = days_in_month(year, month)?;
    let mut records = Vec::new();

    for row in 0..table.row_count() {
        let code_cell = table.cell(row, code_index).as_text();
        if code_cell.trim().is_empty() {
            continue;
        }
        let employee = normalize_employee_code(&code_cell);
        let employee_name = name_index
            .map(|index| table.cell(row, index).as_text().trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| employee.clone());

        // One shared pool of days per employee: statuses consume days
        // off the front in configuration order, so no day is ever
        // assigned twice and no employee exceeds the month's length.
        let mut next_day: u32 = 1;

        for (status, column) in &status_indices {
            let Some(count) = table.cell(row, *column).as_number() else {
                // Non-numeric totals skip this status for this row.
                continue;
            };
            let count = count as i64;
            if count <= 0 {
                continue;
            }

            for _ in 0..count {
                if next_day > last_day {
                    tracing::warn!(
                        employee = %employee,
                        "summary counts exceed days in month, extra records dropped"
                    );
                    break;
                }
                if let Some(attendance_date) = NaiveDate::from_ymd_opt(year, month, next_day) {
                    records.push(AttendanceRecord {
                        employee: employee.clone(),
                        employee_name: employee_name.clone(),
                        attendance_date,
                        status: status.to_string(),
                    });
                }
                next_day += 1;
            }
        }
    }

    Ok(records)
}
