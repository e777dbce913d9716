use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RollcallError {
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Job error: {0}")]
    Job(#[from] JobError),

    #[error("Submission error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

/// Errors from loading or interpreting a tabular source.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A configured logical column could not be resolved. This is the
    /// dominant real-world failure, so the message carries the full
    /// actual column list to make it self-diagnosing.
    #[error("Column '{logical}' not found. Available columns: {}", available.join(", "))]
    ColumnNotFound {
        logical: String,
        available: Vec<String>,
    },

    #[error("Failed to read '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse JSON source: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No usable grid could be recovered from '{path}'")]
    NoUsableGrid { path: PathBuf },

    #[error("Invalid parsing configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse stored JSON at '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from the job lifecycle controller.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Job '{0}' not found")]
    NotFound(String),

    #[error("Invalid status transition {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Job is not in a submittable state (current status: {status})")]
    NotSubmittable { status: String },

    #[error("Job '{0}' has no processed data to submit")]
    MissingProcessedData(String),

    #[error("Unrecognized stored status '{0}'")]
    CorruptStatus(String),

    #[error("Failed to encode job metadata: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors raised before any record is attempted. Per-record rejections
/// are never errors here; they are aggregated as `RecordFailure`s.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Submission setup failed: {0}")]
    Setup(String),
}

pub type Result<T> = std::result::Result<T, RollcallError>;
