//! Isolated test environment: in-memory database plus a temp data
//! directory, torn down automatically.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

use rollcall::db::mapping_repo;
use rollcall::{
    CodeMappingEntry, Database, JobController, JobStorage, ParseMode, ParsingConfig, StatusColumn,
    IGNORE,
};

pub struct TestHarness {
    pub db: Database,
    pub controller: JobController,
    dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let db = Database::open_in_memory().expect("open in-memory db");
        let controller = JobController::new(db.clone(), JobStorage::new(dir.path()));
        Self {
            db,
            controller,
            dir,
        }
    }

    /// Writes a source file into the temp directory and returns its
    /// path, ready to hand to `create_job`.
    pub fn write_source(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("write source file");
        path
    }

    /// A typical mapping profile: A/L/HD actionable, P ignored.
    pub fn standard_mapping(&self) -> String {
        mapping_repo::create(
            &self.db,
            "standard codes",
            &[
                entry("A", "Absent"),
                entry("L", "On Leave"),
                entry("HD", "Half Day"),
                entry("P", IGNORE),
            ],
        )
        .expect("create mapping profile")
    }
}

pub fn entry(source_code: &str, target_status: &str) -> CodeMappingEntry {
    CodeMappingEntry {
        source_code: source_code.to_string(),
        target_status: target_status.to_string(),
    }
}

pub fn matrix_config(code_column: &str, start: &str, end: &str) -> ParsingConfig {
    ParsingConfig {
        mode: ParseMode::Matrix,
        employee_code_column: code_column.to_string(),
        employee_name_column: Some("Name".to_string()),
        day_start_column: Some(start.to_string()),
        day_end_column: Some(end.to_string()),
        status_columns: Vec::new(),
        header_row: None,
        business_rules: Vec::new(),
    }
}

pub fn summary_config(code_column: &str, statuses: &[(&str, &str)]) -> ParsingConfig {
    ParsingConfig {
        mode: ParseMode::Summary,
        employee_code_column: code_column.to_string(),
        employee_name_column: Some("Name".to_string()),
        day_start_column: None,
        day_end_column: None,
        status_columns: statuses
            .iter()
            .map(|(status, column)| StatusColumn {
                status: status.to_string(),
                column: column.to_string(),
            })
            .collect(),
        header_row: None,
        business_rules: Vec::new(),
    }
}
