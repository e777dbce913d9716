//! Per-job document storage.
//!
//! Each job owns two JSON documents under the data directory: a "raw"
//! dump of the loaded table (post business-rule transform, before
//! interpretation) and a "processed" dump of normalized records. The
//! processed document is overwritten in place when a reviewer edits the
//! records, so the same path serves both pre- and post-edit states.

use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::parsing::AttendanceRecord;
use crate::table::Table;

pub struct JobStorage {
    data_directory: PathBuf,
}

impl JobStorage {
    pub fn new<P: AsRef<Path>>(data_directory: P) -> Self {
        Self {
            data_directory: data_directory.as_ref().to_path_buf(),
        }
    }

    pub fn data_directory(&self) -> &Path {
        &self.data_directory
    }

    /// Directory for uploaded source files.
    pub fn upload_dir(&self) -> PathBuf {
        self.data_directory.join("uploads")
    }

    /// Directory for the per-job JSON documents.
    pub fn processed_dir(&self) -> PathBuf {
        self.data_directory.join("processed")
    }

    pub fn upload_path(&self, storage_filename: &str) -> PathBuf {
        self.upload_dir().join(storage_filename)
    }

    /// Writes the raw table dump for a job and returns its path.
    pub fn save_raw_table(&self, job_id: &str, table: &Table) -> Result<PathBuf, StorageError> {
        let path = self.processed_dir().join(format!("{job_id}_raw.json"));
        self.write_json(&path, &table.to_json_rows())?;
        Ok(path)
    }

    /// Writes the processed record dump for a job and returns its path.
    pub fn save_records(
        &self,
        job_id: &str,
        records: &[AttendanceRecord],
    ) -> Result<PathBuf, StorageError> {
        let path = self.processed_dir().join(format!("{job_id}_processed.json"));
        self.write_json(&path, records)?;
        Ok(path)
    }

    /// Reads a processed record dump back.
    pub fn load_records(&self, path: &Path) -> Result<Vec<AttendanceRecord>, StorageError> {
        let text = std::fs::read_to_string(path).map_err(|e| StorageError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| StorageError::ParseJson {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Best-effort removal of every file a job owns. Failures are
    /// logged and never propagate: the authoritative row deletion must
    /// not be blocked by a missing or locked file.
    pub fn remove_job_files(&self, paths: &[Option<&str>]) {
        for path in paths.iter().flatten() {
            let path = Path::new(path);
            if !path.exists() {
                continue;
            }
            if let Err(e) = std::fs::remove_file(path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove job file");
            }
        }
    }

    fn write_json<T: serde::Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
    ) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json =
            serde_json::to_string_pretty(value).map_err(|e| StorageError::ParseJson {
                path: path.to_path_buf(),
                source: e,
            })?;
        std::fs::write(path, json).map_err(|e| StorageError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;
    use chrono::NaiveDate;

    fn record(day: u32) -> AttendanceRecord {
        AttendanceRecord {
            employee: "E-1".into(),
            employee_name: "John".into(),
            attendance_date: NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
            status: "Absent".into(),
        }
    }

    #[test]
    fn records_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JobStorage::new(dir.path());

        let path = storage.save_records("j1", &[record(1), record(2)]).unwrap();
        let loaded = storage.load_records(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], record(1));
    }

    #[test]
    fn raw_dump_is_an_array_of_flat_objects() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JobStorage::new(dir.path());

        let mut table = Table::new(vec!["Code".into(), "1".into()]);
        table.push_row(vec![CellValue::from_text("E-1"), CellValue::from_text("A")]);

        let path = storage.save_raw_table("j1", &table).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["Code"], "E-1");
        assert_eq!(value[0]["1"], "A");
    }

    #[test]
    fn remove_job_files_tolerates_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JobStorage::new(dir.path());
        let path = storage.save_records("j1", &[record(1)]).unwrap();

        let path_str = path.display().to_string();
        storage.remove_job_files(&[Some(path_str.as_str()), Some("/nonexistent/x.json"), None]);
        assert!(!path.exists());
    }
}
