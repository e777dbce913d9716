pub mod columns;
pub mod db;
pub mod error;
pub mod job;
pub mod mapping;
pub mod parsing;
pub mod rules;
pub mod storage;
pub mod submit;
pub mod table;
pub mod worker;

pub use db::{default_database_path, Database, DatabaseError};
pub use error::{ExtractError, JobError, Result, RollcallError, StorageError, SubmitError};
pub use job::{ErrorLog, JobController, JobStatus, RecordFailure};
pub use mapping::{CodeMapping, CodeMappingEntry, IGNORE};
pub use parsing::{AttendanceRecord, ParseMode, ParsingConfig, StatusColumn};
pub use rules::BusinessRule;
pub use storage::JobStorage;
pub use submit::{
    build_employee_map, submit_records, AttendancePayload, ExternalEmployee, HrClient,
    HrClientError, HttpHrClient, SubmissionReport,
};
pub use table::{load_table, CellValue, Table};
