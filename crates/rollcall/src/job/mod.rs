//! Job lifecycle model: the status state machine and the structured
//! error log that accompanies every failed transition.

pub mod controller;

pub use controller::JobController;

use serde::{Deserialize, Serialize};

use crate::parsing::AttendanceRecord;

/// The finite status set of a conversion job.
///
/// Modeled as an enum with an explicit transition table so an invalid
/// status can never be written: [`JobController`] is the single
/// mutation site and consults [`JobStatus::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Uploaded,
    Processing,
    AwaitingValidation,
    ExtractionFailed,
    PendingSubmission,
    Submitting,
    SubmissionFailed,
    Completed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Uploaded => "UPLOADED",
            JobStatus::Processing => "PROCESSING",
            JobStatus::AwaitingValidation => "AWAITING_VALIDATION",
            JobStatus::ExtractionFailed => "EXTRACTION_FAILED",
            JobStatus::PendingSubmission => "PENDING_SUBMISSION",
            JobStatus::Submitting => "SUBMITTING",
            JobStatus::SubmissionFailed => "SUBMISSION_FAILED",
            JobStatus::Completed => "COMPLETED",
        }
    }

    /// The legal transition table.
    ///
    /// `EXTRACTION_FAILED` and `COMPLETED` are terminal: a failed
    /// extraction needs a fresh upload, a completed job can only be
    /// deleted. `SUBMISSION_FAILED` re-enters `PENDING_SUBMISSION` so a
    /// corrected batch can be resubmitted without re-extraction.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Uploaded, Processing)
                | (Processing, AwaitingValidation)
                | (Processing, ExtractionFailed)
                | (AwaitingValidation, PendingSubmission)
                | (PendingSubmission, Submitting)
                | (Submitting, Completed)
                | (Submitting, SubmissionFailed)
                | (SubmissionFailed, PendingSubmission)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::ExtractionFailed | JobStatus::Completed)
    }

    /// States from which a submit request is accepted. A precondition
    /// check, not a lock: callers must not issue concurrent submits for
    /// the same job id.
    pub fn is_submittable(&self) -> bool {
        matches!(
            self,
            JobStatus::AwaitingValidation | JobStatus::SubmissionFailed
        )
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPLOADED" => Ok(JobStatus::Uploaded),
            "PROCESSING" => Ok(JobStatus::Processing),
            "AWAITING_VALIDATION" => Ok(JobStatus::AwaitingValidation),
            "EXTRACTION_FAILED" => Ok(JobStatus::ExtractionFailed),
            "PENDING_SUBMISSION" => Ok(JobStatus::PendingSubmission),
            "SUBMITTING" => Ok(JobStatus::Submitting),
            "SUBMISSION_FAILED" => Ok(JobStatus::SubmissionFailed),
            "COMPLETED" => Ok(JobStatus::Completed),
            other => Err(format!("unknown job status '{other}'")),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rejected record from a submission run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFailure {
    pub record_index: usize,
    /// The employee code as extracted.
    pub employee: String,
    /// The external-system id it mapped to, when mapping got that far.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_employee: Option<String>,
    pub record: AttendanceRecord,
    pub error: String,
}

/// The sole surface for reporting extraction/submission failure detail.
/// Stored as a JSON column on the job row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLog {
    /// Which step failed: "extraction", "submission" or
    /// "submission_setup".
    pub step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<RecordFailure>,
}

impl ErrorLog {
    pub fn step_message(step: &str, message: impl Into<String>) -> Self {
        Self {
            step: step.to_string(),
            summary: None,
            message: Some(message.into()),
            details: Vec::new(),
        }
    }

    pub fn submission(total: usize, failures: Vec<RecordFailure>) -> Self {
        Self {
            step: "submission".to_string(),
            summary: Some(format!("{} of {} records failed", failures.len(), total)),
            message: None,
            details: failures,
        }
    }
}
