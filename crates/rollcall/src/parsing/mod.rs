//! Layout interpretation: turning a loaded table into normalized
//! attendance records.
//!
//! Two layouts exist in the wild. MATRIX sheets carry one column per
//! calendar day with a status code in each cell; SUMMARY sheets carry
//! one column per status with a monthly total. Both interpret into the
//! same record shape.

pub mod matrix;
pub mod summary;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::columns::resolve_column;
use crate::error::ExtractError;
use crate::mapping::CodeMapping;
use crate::rules::BusinessRule;
use crate::table::Table;

/// The two supported tabular layouts. Adding a third mode is a
/// compile-time-checked change: every dispatch is an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParseMode {
    Matrix,
    Summary,
}

/// One SUMMARY count column: which canonical status it totals.
///
/// An ordered list rather than a map: the day pool is consumed in
/// status order, so iteration order is part of the semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusColumn {
    pub status: String,
    pub column: String,
}

/// Per-job parsing configuration, authored during the analysis step and
/// immutable afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsingConfig {
    pub mode: ParseMode,
    pub employee_code_column: String,
    #[serde(default)]
    pub employee_name_column: Option<String>,
    /// MATRIX only: first and last day column, by literal or prefix
    /// match against the table.
    #[serde(default)]
    pub day_start_column: Option<String>,
    #[serde(default)]
    pub day_end_column: Option<String>,
    /// SUMMARY only.
    #[serde(default)]
    pub status_columns: Vec<StatusColumn>,
    /// Declared header row; absent or 0 means "infer".
    #[serde(default)]
    pub header_row: Option<usize>,
    #[serde(default)]
    pub business_rules: Vec<BusinessRule>,
}

impl ParsingConfig {
    /// Every column name this configuration mentions, used as hints by
    /// header-row inference.
    pub fn expected_columns(&self) -> Vec<String> {
        let mut expected = vec![self.employee_code_column.clone()];
        expected.extend(self.employee_name_column.iter().cloned());
        expected.extend(self.day_start_column.iter().cloned());
        expected.extend(self.day_end_column.iter().cloned());
        expected.extend(self.status_columns.iter().map(|s| s.column.clone()));
        expected
    }
}

/// The normalized per-employee per-date record every layout produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub employee: String,
    pub employee_name: String,
    pub attendance_date: NaiveDate,
    pub status: String,
}

/// Interprets a loaded (and business-rule transformed) table.
///
/// Fails with [`ExtractError::ColumnNotFound`] when a required logical
/// column cannot be resolved; the error names the column and lists what
/// the table actually contains.
pub fn interpret(
    table: &Table,
    config: &ParsingConfig,
    year: i32,
    month: u32,
    mapping: &CodeMapping,
) -> Result<Vec<AttendanceRecord>, ExtractError> {
    match config.mode {
        ParseMode::Matrix => matrix::interpret(table, config, year, month, mapping),
        ParseMode::Summary => summary::interpret(table, config, year, month, mapping),
    }
}

/// Resolves a required logical column to its index.
pub(crate) fn resolve_required(table: &Table, logical: &str) -> Result<usize, ExtractError> {
    resolve_column(table.columns(), logical)
        .and_then(|label| table.column_index(label))
        .ok_or_else(|| ExtractError::ColumnNotFound {
            logical: logical.to_string(),
            available: table.columns().to_vec(),
        })
}

/// Employee code and display-name column indices. The name column is
/// optional; a `None` means "use the code as the display name".
pub(crate) fn resolve_employee_columns(
    table: &Table,
    config: &ParsingConfig,
) -> Result<(usize, Option<usize>), ExtractError> {
    let code_index = resolve_required(table, &config.employee_code_column)?;
    let name_index = match &config.employee_name_column {
        Some(logical) => resolve_column(table.columns(), logical)
            .and_then(|label| table.column_index(label)),
        None => None,
    };
    Ok((code_index, name_index))
}

/// Trim and uppercase only. Internal separators (hyphens) are
/// semantically significant in this domain and must survive.
pub(crate) fn normalize_employee_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Number of days in the month, or `InvalidConfig` when `month` is not
/// a calendar month. A mistyped month must fail the job diagnosably,
/// never extract an empty record set.
pub(crate) fn days_in_month(year: i32, month: u32) -> Result<u32, ExtractError> {
    (28..=31)
        .rev()
        .find(|&day| NaiveDate::from_ymd_opt(year, month, day).is_some())
        .ok_or_else(|| {
            ExtractError::InvalidConfig(format!("month {month} is not a valid calendar month"))
        })
}
