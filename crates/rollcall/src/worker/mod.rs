//! Background execution of long-running job steps.
//!
//! Extraction is file- and CPU-bound, so it runs on the blocking pool;
//! submission is network-bound and runs as a plain task. Both report
//! their outcome through the returned handle and, authoritatively,
//! through the job row they update.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::db::job_repo::JobRow;
use crate::error::Result;
use crate::job::JobController;
use crate::submit::{HrClient, SubmissionReport};

/// Runs extraction for `job_id` off the async runtime.
pub fn spawn_extraction(
    controller: Arc<JobController>,
    job_id: String,
) -> JoinHandle<Result<JobRow>> {
    tokio::task::spawn_blocking(move || controller.run_extraction(&job_id))
}

/// Runs submission for `job_id` as a background task.
pub fn spawn_submission(
    controller: Arc<JobController>,
    client: Arc<dyn HrClient>,
    job_id: String,
) -> JoinHandle<Result<SubmissionReport>> {
    tokio::spawn(async move { controller.run_submission(&job_id, client.as_ref()).await })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::parsing::{ParseMode, ParsingConfig};
    use crate::storage::JobStorage;

    fn controller(dir: &std::path::Path) -> Arc<JobController> {
        Arc::new(JobController::new(
            Database::open_in_memory().unwrap(),
            JobStorage::new(dir),
        ))
    }

    #[tokio::test]
    async fn extraction_runs_off_the_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller(dir.path());

        let source = dir.path().join("n.csv");
        std::fs::write(&source, "Empl Code,1\nE-1,A\n").unwrap();
        let config = ParsingConfig {
            mode: ParseMode::Matrix,
            employee_code_column: "Empl Code".into(),
            employee_name_column: None,
            day_start_column: Some("1".into()),
            day_end_column: Some("1".into()),
            status_columns: vec![],
            header_row: None,
            business_rules: vec![],
        };
        let row = controller
            .create_job(&source, "n.csv", 2025, 11, &config, None)
            .unwrap();

        let handle = spawn_extraction(controller.clone(), row.id.clone());
        let row = handle.await.unwrap().unwrap();
        // No mapping profile: every code is unmapped, zero records, but
        // the step itself succeeds.
        assert_eq!(row.status, "AWAITING_VALIDATION");
    }
}
