//! Scripted HR clients for submission tests.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;

use rollcall::{AttendancePayload, ExternalEmployee, HrClient, HrClientError};

/// An in-process stand-in for the external HR system.
///
/// Serves a fixed employee directory, rejects payloads for the listed
/// attendance dates and records every attempted payload.
pub struct ScriptedClient {
    employees: Vec<ExternalEmployee>,
    reject_dates: Vec<String>,
    connection_error: Option<String>,
    pub attempted: Mutex<Vec<AttendancePayload>>,
}

impl ScriptedClient {
    pub fn new(employees: Vec<ExternalEmployee>) -> Self {
        Self {
            employees,
            reject_dates: Vec::new(),
            connection_error: None,
            attempted: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting_dates(mut self, dates: &[&str]) -> Self {
        self.reject_dates = dates.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn unreachable(mut self, message: &str) -> Self {
        self.connection_error = Some(message.to_string());
        self
    }

    pub fn employee(id: &str, company_code: &str) -> ExternalEmployee {
        ExternalEmployee {
            id: id.to_string(),
            company_employee_id: Some(company_code.to_string()),
            employee_name: None,
        }
    }

    pub fn attempt_count(&self) -> usize {
        self.attempted.lock().unwrap().len()
    }
}

#[async_trait]
impl HrClient for ScriptedClient {
    async fn check_connection(&self) -> Result<(), HrClientError> {
        match &self.connection_error {
            Some(message) => Err(HrClientError::Rejected(message.clone())),
            None => Ok(()),
        }
    }

    async fn create_attendance(&self, payload: &AttendancePayload) -> Result<(), HrClientError> {
        self.attempted.lock().unwrap().push(payload.clone());
        if self.reject_dates.contains(&payload.attendance_date) {
            Err(HrClientError::Rejected(format!(
                "Attendance for {} already exists",
                payload.attendance_date
            )))
        } else {
            Ok(())
        }
    }

    async fn fetch_employees(&self) -> Result<Vec<ExternalEmployee>, HrClientError> {
        Ok(self.employees.clone())
    }
}
