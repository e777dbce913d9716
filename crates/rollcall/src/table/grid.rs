//! Best-effort grid recovery from OCR / plain text output.
//!
//! This is the lowest-confidence loader backend: OCR engines return an
//! unaligned stream of lines, so cells are recovered by splitting on
//! runs of whitespace and the widest early line is taken as the header.
//! Callers should expect wider error tolerances here than from the
//! spreadsheet and CSV backends.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ExtractError;

use super::{CellValue, Table};

/// Lines with fewer tokens than this are treated as noise.
const MIN_LINE_TOKENS: usize = 2;

/// Only lines this early in the text compete for the header slot.
const HEADER_CANDIDATE_WINDOW: usize = 20;

fn cell_splitter() -> &'static Regex {
    static SPLITTER: OnceLock<Regex> = OnceLock::new();
    // Two or more spaces, or a tab, separate cells. Single spaces stay
    // inside a cell so multi-word names survive.
    SPLITTER.get_or_init(|| Regex::new(r"\t|\s{2,}").expect("static regex"))
}

/// Converts raw recognized text into a [`Table`].
///
/// The widest line among the first [`HEADER_CANDIDATE_WINDOW`] usable
/// lines becomes the header; every other line becomes a data row padded
/// or truncated to the header width.
pub fn table_from_text(text: &str, path: &Path) -> Result<Table, ExtractError> {
    let tokenized: Vec<Vec<String>> = text
        .lines()
        .map(tokenize_line)
        .filter(|tokens| tokens.len() >= MIN_LINE_TOKENS)
        .collect();

    if tokenized.len() < 2 {
        return Err(ExtractError::NoUsableGrid {
            path: path.to_path_buf(),
        });
    }

    // Strictly-greater comparison: ties go to the earliest line, so a
    // uniform grid keeps its first line as the header.
    let mut header_index = 0;
    for (index, tokens) in tokenized.iter().enumerate().take(HEADER_CANDIDATE_WINDOW) {
        if tokens.len() > tokenized[header_index].len() {
            header_index = index;
        }
    }

    let columns = tokenized[header_index].clone();
    if columns.len() < MIN_LINE_TOKENS {
        return Err(ExtractError::NoUsableGrid {
            path: path.to_path_buf(),
        });
    }

    let mut table = Table::new(columns);
    for (index, tokens) in tokenized.iter().enumerate() {
        if index == header_index {
            continue;
        }
        table.push_row(tokens.iter().map(|t| CellValue::from_text(t)).collect());
    }

    tracing::debug!(
        rows = table.row_count(),
        columns = table.columns().len(),
        "recovered grid from text"
    );

    Ok(table)
}

fn tokenize_line(line: &str) -> Vec<String> {
    cell_splitter()
        .split(line.trim())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(text: &str) -> Result<Table, ExtractError> {
        table_from_text(text, &PathBuf::from("scan.txt"))
    }

    #[test]
    fn widest_line_becomes_header() {
        let text = "Attendance  November\n\
                    Code  Name  1  2  3\n\
                    E-1  John Doe  P  A  L\n\
                    E-2  Jane Roe  A  P  P\n";
        let table = parse(text).unwrap();
        assert_eq!(table.columns(), ["Code", "Name", "1", "2", "3"]);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn uniform_grid_keeps_first_line_as_header() {
        // Every line has the same width; the first must win.
        let text = "Code  Name  1\n\
                    E-1  John  P\n\
                    E-2  Jane  A\n";
        let table = parse(text).unwrap();
        assert_eq!(table.columns(), ["Code", "Name", "1"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 0).as_text(), "E-1");
    }

    #[test]
    fn single_spaces_stay_inside_cells() {
        let text = "Code  Employee Name\nE-1  John Doe\n";
        let table = parse(text).unwrap();
        assert_eq!(table.columns(), ["Code", "Employee Name"]);
        assert_eq!(table.cell(0, 1).as_text(), "John Doe");
    }

    #[test]
    fn degenerate_text_is_rejected() {
        assert!(matches!(
            parse("just-one-token\n"),
            Err(ExtractError::NoUsableGrid { .. })
        ));
        assert!(matches!(parse(""), Err(ExtractError::NoUsableGrid { .. })));
    }

    #[test]
    fn rows_are_padded_to_header_width() {
        let text = "Code  Name  1  2\nE-1  John  P\n";
        let table = parse(text).unwrap();
        assert!(table.cell(0, 3).is_empty());
    }
}
