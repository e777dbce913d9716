//! Job repository: CRUD operations for the `jobs` table.

use rusqlite::{params, Row};

use super::{Database, DatabaseError};

/// A raw job row from the database. Status and JSON columns are kept as
/// strings here; the job controller owns their typed forms.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: String,
    pub original_filename: String,
    pub storage_filename: String,
    pub status: String,
    pub attendance_year: i32,
    pub attendance_month: u32,
    pub parsing_config: String,
    pub mapping_profile_id: Option<String>,
    pub raw_data_path: Option<String>,
    pub processed_data_path: Option<String>,
    pub error_log: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            original_filename: row.get("original_filename")?,
            storage_filename: row.get("storage_filename")?,
            status: row.get("status")?,
            attendance_year: row.get("attendance_year")?,
            attendance_month: row.get("attendance_month")?,
            parsing_config: row.get("parsing_config")?,
            mapping_profile_id: row.get("mapping_profile_id")?,
            raw_data_path: row.get("raw_data_path")?,
            processed_data_path: row.get("processed_data_path")?,
            error_log: row.get("error_log")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            completed_at: row.get("completed_at")?,
        })
    }
}

/// Inserts a new job row.
pub fn insert(db: &Database, job: &JobRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO jobs (id, original_filename, storage_filename, status,
             attendance_year, attendance_month, parsing_config, mapping_profile_id,
             raw_data_path, processed_data_path, error_log, created_at, updated_at,
             completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                job.id,
                job.original_filename,
                job.storage_filename,
                job.status,
                job.attendance_year,
                job.attendance_month,
                job.parsing_config,
                job.mapping_profile_id,
                job.raw_data_path,
                job.processed_data_path,
                job.error_log,
                job.created_at,
                job.updated_at,
                job.completed_at,
            ],
        )?;
        Ok(())
    })
}

/// Updates an existing job row. All fields except `id`, `created_at`
/// and the parsing config (immutable once attached) are overwritten.
pub fn update(db: &Database, job: &JobRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE jobs SET status=?2, raw_data_path=?3, processed_data_path=?4,
             error_log=?5, updated_at=?6, completed_at=?7
             WHERE id=?1",
            params![
                job.id,
                job.status,
                job.raw_data_path,
                job.processed_data_path,
                job.error_log,
                job.updated_at,
                job.completed_at,
            ],
        )?;
        Ok(())
    })
}

/// Finds a job by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM jobs WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], JobRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Lists all jobs, most recent first.
pub fn list(db: &Database) -> Result<Vec<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM jobs ORDER BY created_at DESC")?;
        let rows = stmt.query_map([], JobRow::from_row)?;
        let mut jobs = Vec::new();
        for row in rows {
            jobs.push(row?);
        }
        Ok(jobs)
    })
}

/// Deletes a job row. Returns whether a row existed.
pub fn delete(db: &Database, id: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute("DELETE FROM jobs WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    })
}
