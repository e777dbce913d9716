//! Header-row inference for files with no declared structure.
//!
//! Real-world attendance sheets open with report titles, org names and
//! blank padding before the actual column header. Each candidate row in
//! a small window at the top of the file is scored and the best one
//! becomes the header.

use super::CellValue;

/// How many leading rows are considered as header candidates.
const SCAN_WINDOW: usize = 20;

/// A best-scoring row deeper than this is treated as a misfire and the
/// loader falls back to row 0.
const SANITY_BOUND: usize = 15;

/// Domain words that frequently occur in attendance sheet headers.
const HEADER_KEYWORDS: &[&str] = &[
    "code",
    "name",
    "date",
    "status",
    "day",
    "days",
    "department",
    "designation",
    "employee",
    "emp",
    "id",
    "no",
    "s.no",
    "sr",
    "total",
    "attendance",
    "shift",
    "month",
    "present",
    "absent",
    "leave",
];

const NON_EMPTY_WEIGHT: f64 = 2.0;
const KEYWORD_WEIGHT: f64 = 15.0;
const EXPECTED_WEIGHT: f64 = 25.0;
const NUMERIC_PENALTY: f64 = 20.0;
const TITLE_PENALTY: f64 = 50.0;

/// A single non-empty cell longer than this marks a report title row.
const TITLE_CELL_LEN: usize = 30;

/// Picks the most plausible header row among the first [`SCAN_WINDOW`]
/// rows. `expected` carries the column names the caller's configuration
/// declares; a row containing them is almost certainly the header.
///
/// Ties favor the earliest row; if the winner sits deeper than
/// [`SANITY_BOUND`], row 0 is used instead.
pub fn infer_header_row(rows: &[Vec<CellValue>], expected: &[String]) -> usize {
    let expected_lower: Vec<String> = expected.iter().map(|e| e.trim().to_lowercase()).collect();

    let mut best_index = 0;
    let mut best_score = f64::MIN;

    for (index, row) in rows.iter().take(SCAN_WINDOW).enumerate() {
        let score = score_row(row, &expected_lower);
        if score > best_score {
            best_score = score;
            best_index = index;
        }
    }

    if best_index > SANITY_BOUND {
        tracing::warn!(
            best_index,
            "header inference picked an implausibly deep row, falling back to row 0"
        );
        return 0;
    }

    best_index
}

fn score_row(row: &[CellValue], expected_lower: &[String]) -> f64 {
    let non_empty: Vec<&CellValue> = row.iter().filter(|c| !c.is_empty()).collect();
    if non_empty.is_empty() {
        return 0.0;
    }

    let mut keyword_hits = 0usize;
    let mut expected_hits = 0usize;
    let mut numeric_cells = 0usize;

    for cell in &non_empty {
        let text = cell.as_text();
        let lower = text.trim().to_lowercase();

        if HEADER_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            keyword_hits += 1;
        }
        if expected_lower.iter().any(|e| !e.is_empty() && lower == *e) {
            expected_hits += 1;
        }
        if cell.is_numeric() {
            numeric_cells += 1;
        }
    }

    let numeric_fraction = numeric_cells as f64 / non_empty.len() as f64;

    let mut score = NON_EMPTY_WEIGHT * non_empty.len() as f64
        + KEYWORD_WEIGHT * keyword_hits as f64
        + EXPECTED_WEIGHT * expected_hits as f64
        - NUMERIC_PENALTY * numeric_fraction;

    // A lone long text cell is a report title, not a header.
    if non_empty.len() == 1 && non_empty[0].as_text().trim().len() > TITLE_CELL_LEN {
        score -= TITLE_PENALTY;
    }

    score
}
