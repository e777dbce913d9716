//! Pre-interpretation business rules.
//!
//! Rules are an ordered list of tagged variants applied left to right,
//! each producing a new table. This is a best-effort preprocessing
//! pass: a rule that cannot apply is skipped with a warning and never
//! aborts the remaining rules or the job.

use serde::{Deserialize, Serialize};

use crate::columns::resolve_column;
use crate::table::{CellValue, Table};

/// A declarative numeric transform over the loaded table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum BusinessRule {
    /// Converts N fractional units into whole units, row-wise:
    /// `whole += floor(fractional / rate)`, `fractional %= rate`.
    ///
    /// The canonical use is "3 short leaves become 1 full leave".
    ConvertUnits {
        fractional_column: String,
        whole_column: String,
        rate: i64,
    },
    /// Forward-compatible: configurations written against a newer rule
    /// vocabulary deserialize here and are skipped.
    #[serde(other)]
    Unknown,
}

/// Applies `rules` in order over `table`, returning a new table. The
/// input is never mutated.
pub fn apply_rules(table: &Table, rules: &[BusinessRule]) -> Table {
    let mut current = table.clone();
    for rule in rules {
        current = apply_rule(current, rule);
    }
    current
}

fn apply_rule(table: Table, rule: &BusinessRule) -> Table {
    match rule {
        BusinessRule::ConvertUnits {
            fractional_column,
            whole_column,
            rate,
        } => apply_convert_units(table, fractional_column, whole_column, *rate),
        BusinessRule::Unknown => {
            tracing::warn!("skipping unknown business rule");
            table
        }
    }
}

fn apply_convert_units(mut table: Table, fractional: &str, whole: &str, rate: i64) -> Table {
    if rate <= 0 {
        tracing::warn!(rate, "convert_units: non-positive rate, rule skipped");
        return table;
    }

    let fractional_index =
        resolve_column(table.columns(), fractional).and_then(|label| table.column_index(label));
    let whole_index =
        resolve_column(table.columns(), whole).and_then(|label| table.column_index(label));

    let (fractional_index, whole_index) = match (fractional_index, whole_index) {
        (Some(f), Some(w)) => (f, w),
        _ => {
            tracing::warn!(
                fractional_column = fractional,
                whole_column = whole,
                "convert_units: column not resolved, rule skipped"
            );
            return table;
        }
    };

    let rate = rate as f64;
    for row in 0..table.row_count() {
        // Missing or non-numeric cells count as zero.
        let frac = table.cell(row, fractional_index).as_number().unwrap_or(0.0);
        let whole = table.cell(row, whole_index).as_number().unwrap_or(0.0);

        let carried = (frac / rate).floor();
        let remainder = frac - carried * rate;

        table.set_cell(row, whole_index, CellValue::Number(whole + carried));
        table.set_cell(row, fractional_index, CellValue::Number(remainder));
    }

    table
}
