//! The job lifecycle controller: the single place where job status is
//! mutated.
//!
//! Every operation loads the authoritative row, validates the requested
//! transition against [`JobStatus::can_transition_to`] and persists the
//! result. A `*_FAILED` status is always written together with an
//! [`ErrorLog`].

use std::path::{Path, PathBuf};

use crate::db::{job_repo, job_repo::JobRow, mapping_repo, Database};
use crate::error::{JobError, Result, RollcallError, StorageError, SubmitError};
use crate::mapping::CodeMapping;
use crate::parsing::{interpret, AttendanceRecord, ParsingConfig};
use crate::rules::apply_rules;
use crate::storage::JobStorage;
use crate::submit::{build_employee_map, submit_records, HrClient, SubmissionReport};
use crate::table::load_table;

use super::{ErrorLog, JobStatus};

pub struct JobController {
    db: Database,
    storage: JobStorage,
}

impl JobController {
    pub fn new(db: Database, storage: JobStorage) -> Self {
        Self { db, storage }
    }

    pub fn storage(&self) -> &JobStorage {
        &self.storage
    }

    /// Registers an uploaded file as a new job in `UPLOADED`.
    ///
    /// The source file is copied into the upload directory under a
    /// collision-free name derived from the job id; the original name
    /// is kept for display only.
    pub fn create_job(
        &self,
        source: &Path,
        original_filename: &str,
        year: i32,
        month: u32,
        config: &ParsingConfig,
        mapping_profile_id: Option<&str>,
    ) -> Result<JobRow> {
        let id = uuid::Uuid::new_v4().to_string();
        let storage_filename = match Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
        {
            Some(extension) => format!("{id}.{extension}"),
            None => id.clone(),
        };

        let dest = self.storage.upload_path(&storage_filename);
        let upload_dir = self.storage.upload_dir();
        std::fs::create_dir_all(&upload_dir).map_err(|e| StorageError::CreateDirectory {
            path: upload_dir,
            source: e,
        })?;
        std::fs::copy(source, &dest).map_err(|e| StorageError::WriteFile {
            path: dest.clone(),
            source: e,
        })?;

        let now = chrono::Utc::now().to_rfc3339();
        let row = JobRow {
            id,
            original_filename: original_filename.to_string(),
            storage_filename,
            status: JobStatus::Uploaded.as_str().to_string(),
            attendance_year: year,
            attendance_month: month,
            parsing_config: serde_json::to_string(config).map_err(JobError::Encode)?,
            mapping_profile_id: mapping_profile_id.map(str::to_string),
            raw_data_path: None,
            processed_data_path: None,
            error_log: None,
            created_at: now.clone(),
            updated_at: now,
            completed_at: None,
        };
        job_repo::insert(&self.db, &row)?;

        tracing::info!(job_id = %row.id, file = original_filename, "job created");
        Ok(row)
    }

    /// Runs extraction end to end for a freshly uploaded job.
    ///
    /// Moves `UPLOADED -> PROCESSING` up front, then lands on
    /// `AWAITING_VALIDATION` with both data paths set, or on
    /// `EXTRACTION_FAILED` with an error log. Extraction failure is a
    /// job outcome, not an `Err`: the returned row carries it.
    pub fn run_extraction(&self, job_id: &str) -> Result<JobRow> {
        let row = self.require(job_id)?;
        let mut row = self.set_status(row, JobStatus::Processing)?;

        match self.extract(&row) {
            Ok((raw_path, processed_path, count)) => {
                tracing::info!(job_id, records = count, "extraction finished");
                row.raw_data_path = Some(raw_path.display().to_string());
                row.processed_data_path = Some(processed_path.display().to_string());
                row.error_log = None;
                self.set_status(row, JobStatus::AwaitingValidation)
            }
            Err(e) => {
                tracing::warn!(job_id, error = %e, "extraction failed");
                row.error_log = Some(encode_log(&ErrorLog::step_message(
                    "extraction",
                    e.to_string(),
                ))?);
                self.set_status(row, JobStatus::ExtractionFailed)
            }
        }
    }

    fn extract(&self, row: &JobRow) -> Result<(PathBuf, PathBuf, usize)> {
        let config: ParsingConfig = serde_json::from_str(&row.parsing_config)
            .map_err(|e| crate::error::ExtractError::InvalidConfig(e.to_string()))?;

        let mapping = match &row.mapping_profile_id {
            Some(id) => mapping_repo::load_mapping(&self.db, id)?.ok_or_else(|| {
                crate::error::ExtractError::InvalidConfig(format!(
                    "mapping profile '{id}' not found"
                ))
            })?,
            None => CodeMapping::new(),
        };

        let source = self.storage.upload_path(&row.storage_filename);
        let table = load_table(&source, config.header_row, &config.expected_columns())?;
        let table = apply_rules(&table, &config.business_rules);
        let raw_path = self.storage.save_raw_table(&row.id, &table)?;

        let records = interpret(
            &table,
            &config,
            row.attendance_year,
            row.attendance_month,
            &mapping,
        )?;
        let processed_path = self.storage.save_records(&row.id, &records)?;

        Ok((raw_path, processed_path, records.len()))
    }

    /// Current status plus the decoded error log, if any.
    pub fn job_status(&self, job_id: &str) -> Result<(JobStatus, Option<ErrorLog>)> {
        let row = self.require(job_id)?;
        let status = parse_status(&row.status)?;
        let log = row
            .error_log
            .as_deref()
            .map(|text| {
                serde_json::from_str(text).map_err(|e| crate::db::DatabaseError::CorruptJson {
                    column: "error_log",
                    source: e,
                })
            })
            .transpose()?;
        Ok((status, log))
    }

    /// Replaces the processed record set with the reviewer's edits and
    /// marks the job ready to submit. Accepted from
    /// `AWAITING_VALIDATION` and from `SUBMISSION_FAILED` (retry with
    /// corrections).
    pub fn persist_edited_records(
        &self,
        job_id: &str,
        records: &[AttendanceRecord],
    ) -> Result<JobRow> {
        let mut row = self.require(job_id)?;
        let status = parse_status(&row.status)?;
        if !status.is_submittable() {
            return Err(JobError::NotSubmittable {
                status: row.status.clone(),
            }
            .into());
        }

        let path = self.storage.save_records(&row.id, records)?;
        row.processed_data_path = Some(path.display().to_string());
        row.error_log = None;
        self.set_status(row, JobStatus::PendingSubmission)
    }

    /// Submits the processed batch to the external system.
    ///
    /// Setup failures (unreachable system, bad credentials, missing
    /// processed data) abort before any record is attempted and return
    /// `Err`; per-record rejections do not. Either way a failed run
    /// lands the job on `SUBMISSION_FAILED` with a log.
    pub async fn run_submission(
        &self,
        job_id: &str,
        client: &dyn HrClient,
    ) -> Result<SubmissionReport> {
        let row = self.require(job_id)?;
        let mut row = self.set_status(row, JobStatus::Submitting)?;

        // A missing or unreadable processed file is a setup failure
        // like any other: the job must land on SUBMISSION_FAILED, not
        // stay stranded in SUBMITTING.
        let records = match &row.processed_data_path {
            Some(path) => match self.storage.load_records(Path::new(path)) {
                Ok(records) => records,
                Err(e) => return self.fail_setup(row, e.into()),
            },
            None => {
                return self.fail_setup(
                    row,
                    JobError::MissingProcessedData(job_id.to_string()).into(),
                )
            }
        };

        let setup = async {
            client.check_connection().await?;
            client.fetch_employees().await
        }
        .await;

        let employee_map = match setup {
            Ok(employees) => build_employee_map(&employees),
            Err(e) => {
                return self.fail_setup(row, SubmitError::Setup(e.to_string()).into());
            }
        };

        let report = submit_records(client, &records, Some(&employee_map)).await;

        if report.is_clean() {
            tracing::info!(job_id, submitted = report.success_count, "submission complete");
            row.error_log = None;
            row.completed_at = Some(chrono::Utc::now().to_rfc3339());
            self.set_status(row, JobStatus::Completed)?;
        } else {
            tracing::warn!(
                job_id,
                failed = report.failures.len(),
                total = report.total,
                "submission finished with failures"
            );
            row.error_log = Some(encode_log(&ErrorLog::submission(
                report.total,
                report.failures.clone(),
            ))?);
            self.set_status(row, JobStatus::SubmissionFailed)?;
        }

        Ok(report)
    }

    fn fail_setup(&self, mut row: JobRow, error: RollcallError) -> Result<SubmissionReport> {
        tracing::warn!(job_id = %row.id, error = %error, "submission setup failed");
        row.error_log = Some(encode_log(&ErrorLog::step_message(
            "submission_setup",
            error.to_string(),
        ))?);
        self.set_status(row, JobStatus::SubmissionFailed)?;
        Err(error)
    }

    /// The processed record set as last persisted, for review and edit.
    pub fn load_processed_records(&self, job_id: &str) -> Result<Vec<AttendanceRecord>> {
        let row = self.require(job_id)?;
        let path = row
            .processed_data_path
            .as_deref()
            .ok_or_else(|| JobError::MissingProcessedData(job_id.to_string()))?;
        Ok(self.storage.load_records(Path::new(path))?)
    }

    /// Deletes a job row and, best-effort, every file it owns. The row
    /// is authoritative: file removal failures are logged, never
    /// propagated. Returns whether the job existed.
    pub fn delete_job(&self, job_id: &str) -> Result<bool> {
        let Some(row) = job_repo::find_by_id(&self.db, job_id)? else {
            return Ok(false);
        };

        let upload = self.storage.upload_path(&row.storage_filename);
        let upload = upload.display().to_string();
        self.storage.remove_job_files(&[
            Some(upload.as_str()),
            row.raw_data_path.as_deref(),
            row.processed_data_path.as_deref(),
        ]);

        let deleted = job_repo::delete(&self.db, job_id)?;
        tracing::info!(job_id, "job deleted");
        Ok(deleted)
    }

    /// All jobs, most recent first.
    pub fn list_jobs(&self) -> Result<Vec<JobRow>> {
        Ok(job_repo::list(&self.db)?)
    }

    pub fn find_job(&self, job_id: &str) -> Result<Option<JobRow>> {
        Ok(job_repo::find_by_id(&self.db, job_id)?)
    }

    fn require(&self, job_id: &str) -> Result<JobRow> {
        job_repo::find_by_id(&self.db, job_id)?
            .ok_or_else(|| JobError::NotFound(job_id.to_string()).into())
    }

    /// The single mutation site. Rejects anything outside the
    /// transition table before touching the database.
    fn set_status(&self, mut row: JobRow, next: JobStatus) -> Result<JobRow> {
        let current = parse_status(&row.status)?;
        if !current.can_transition_to(next) {
            return Err(JobError::InvalidTransition {
                from: row.status.clone(),
                to: next.as_str().to_string(),
            }
            .into());
        }

        row.status = next.as_str().to_string();
        row.updated_at = chrono::Utc::now().to_rfc3339();
        job_repo::update(&self.db, &row)?;

        tracing::debug!(job_id = %row.id, from = %current, to = %next, "job status changed");
        Ok(row)
    }
}

fn parse_status(text: &str) -> Result<JobStatus> {
    text.parse()
        .map_err(|_| JobError::CorruptStatus(text.to_string()).into())
}

fn encode_log(log: &ErrorLog) -> Result<String> {
    Ok(serde_json::to_string(log).map_err(JobError::Encode)?)
}
