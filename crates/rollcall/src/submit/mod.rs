//! Submission reconciler.
//!
//! Every record is attempted regardless of earlier failures in the same
//! run, so one bad row never shadows the rest of the batch. The outcome
//! is a full accounting: success count plus one [`RecordFailure`] per
//! rejected record.

pub mod client;

pub use client::{AttendancePayload, ExternalEmployee, HrClient, HrClientError, HttpHrClient};

use std::collections::HashMap;

use crate::job::RecordFailure;
use crate::parsing::{normalize_employee_code, AttendanceRecord};

/// Shift attached to every submitted document.
const DEFAULT_SHIFT: &str = "Standard";

/// The outcome of one submission run over a record batch.
#[derive(Debug)]
pub struct SubmissionReport {
    pub total: usize,
    pub success_count: usize,
    pub failures: Vec<RecordFailure>,
}

impl SubmissionReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Builds the source-code to external-id map from the target system's
/// employee list. Unlinked employees (no source code on file) are
/// skipped.
pub fn build_employee_map(employees: &[ExternalEmployee]) -> HashMap<String, String> {
    employees
        .iter()
        .filter_map(|e| {
            e.company_employee_id
                .as_deref()
                .filter(|code| !code.trim().is_empty())
                .map(|code| (normalize_employee_code(code), e.id.clone()))
        })
        .collect()
}

/// Submits every record in the batch.
///
/// With `employee_map` present, each record's code is translated to the
/// external id first; a code missing from the map is a per-record
/// failure, not a run abort. With `None` the codes are sent as-is.
pub async fn submit_records(
    client: &dyn HrClient,
    records: &[AttendanceRecord],
    employee_map: Option<&HashMap<String, String>>,
) -> SubmissionReport {
    let mut success_count = 0;
    let mut failures = Vec::new();

    for (record_index, record) in records.iter().enumerate() {
        let mapped = match employee_map {
            Some(map) => map.get(&normalize_employee_code(&record.employee)).cloned(),
            None => Some(record.employee.clone()),
        };

        let Some(employee) = mapped else {
            tracing::warn!(
                employee = %record.employee,
                "employee not linked in the target system, skipping record"
            );
            failures.push(RecordFailure {
                record_index,
                employee: record.employee.clone(),
                mapped_employee: None,
                record: record.clone(),
                error: format!(
                    "Employee '{}' is not linked in the target system",
                    record.employee
                ),
            });
            continue;
        };

        let payload = AttendancePayload {
            employee: employee.clone(),
            attendance_date: record.attendance_date.format("%Y-%m-%d").to_string(),
            status: record.status.clone(),
            shift: DEFAULT_SHIFT.to_string(),
            docstatus: 1,
        };

        match client.create_attendance(&payload).await {
            Ok(()) => success_count += 1,
            Err(e) => {
                tracing::warn!(
                    employee = %record.employee,
                    date = %record.attendance_date,
                    error = %e,
                    "record rejected by the target system"
                );
                failures.push(RecordFailure {
                    record_index,
                    employee: record.employee.clone(),
                    mapped_employee: Some(employee),
                    record: record.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    SubmissionReport {
        total: records.len(),
        success_count,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    /// Rejects any payload whose employee id is listed; records every
    /// attempted payload for assertion.
    struct ScriptedClient {
        reject: Vec<String>,
        attempted: Mutex<Vec<AttendancePayload>>,
    }

    impl ScriptedClient {
        fn new(reject: &[&str]) -> Self {
            Self {
                reject: reject.iter().map(|s| s.to_string()).collect(),
                attempted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HrClient for ScriptedClient {
        async fn check_connection(&self) -> Result<(), HrClientError> {
            Ok(())
        }

        async fn create_attendance(
            &self,
            payload: &AttendancePayload,
        ) -> Result<(), HrClientError> {
            self.attempted.lock().unwrap().push(payload.clone());
            if self.reject.contains(&payload.employee) {
                Err(HrClientError::Rejected("Employee not found".to_string()))
            } else {
                Ok(())
            }
        }

        async fn fetch_employees(&self) -> Result<Vec<ExternalEmployee>, HrClientError> {
            Ok(Vec::new())
        }
    }

    fn record(code: &str, day: u32) -> AttendanceRecord {
        AttendanceRecord {
            employee: code.to_string(),
            employee_name: code.to_string(),
            attendance_date: NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
            status: "Absent".into(),
        }
    }

    #[tokio::test]
    async fn every_record_is_attempted_despite_failures() {
        let client = ScriptedClient::new(&["E-3"]);
        let records: Vec<_> = (1..=5).map(|i| record(&format!("E-{i}"), i)).collect();

        let report = submit_records(&client, &records, None).await;

        assert_eq!(report.total, 5);
        assert_eq!(report.success_count, 4);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].record_index, 2);
        assert_eq!(report.failures[0].employee, "E-3");
        assert_eq!(report.failures[0].mapped_employee.as_deref(), Some("E-3"));
        assert_eq!(client.attempted.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn unmapped_employee_is_a_record_failure() {
        let client = ScriptedClient::new(&[]);
        let map: HashMap<String, String> =
            [("E-1".to_string(), "HR-EMP-0001".to_string())].into();

        let report =
            submit_records(&client, &[record("e-1 ", 1), record("E-9", 2)], Some(&map)).await;

        assert_eq!(report.success_count, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].employee, "E-9");
        assert!(report.failures[0].mapped_employee.is_none());

        // Only the mapped record reached the wire, under its external id.
        let attempted = client.attempted.lock().unwrap();
        assert_eq!(attempted.len(), 1);
        assert_eq!(attempted[0].employee, "HR-EMP-0001");
        assert_eq!(attempted[0].attendance_date, "2025-11-01");
    }

    #[test]
    fn employee_map_normalizes_and_skips_unlinked() {
        let employees = vec![
            ExternalEmployee {
                id: "HR-EMP-0001".into(),
                company_employee_id: Some(" ehpl-003 ".into()),
                employee_name: Some("John".into()),
            },
            ExternalEmployee {
                id: "HR-EMP-0002".into(),
                company_employee_id: None,
                employee_name: None,
            },
            ExternalEmployee {
                id: "HR-EMP-0003".into(),
                company_employee_id: Some("  ".into()),
                employee_name: None,
            },
        ];

        let map = build_employee_map(&employees);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("EHPL-003").map(String::as_str), Some("HR-EMP-0001"));
    }
}
