//! The external HR system boundary.
//!
//! The core never sees raw credentials beyond constructing this client;
//! everything downstream works against the [`HrClient`] trait so tests
//! (and future targets) can substitute their own implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-call timeout for document writes.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shorter timeout for the pre-flight connection check.
const CONNECT_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw error bodies are truncated to keep the job error log readable.
const ERROR_TEXT_LIMIT: usize = 500;

#[derive(Error, Debug)]
pub enum HrClientError {
    /// Network-level failure: unreachable host, timeout, TLS.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The system answered and said no. Carries the unwrapped,
    /// human-usable message.
    #[error("{0}")]
    Rejected(String),
}

/// One attendance document as the external system expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendancePayload {
    pub employee: String,
    pub attendance_date: String,
    pub status: String,
    pub shift: String,
    pub docstatus: u8,
}

/// An employee as listed by the external system, used to build the
/// source-code to external-id map before submission.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalEmployee {
    /// The external system's own document id.
    #[serde(rename = "name")]
    pub id: String,
    /// The code the source organization uses, when linked.
    #[serde(default)]
    pub company_employee_id: Option<String>,
    #[serde(default)]
    pub employee_name: Option<String>,
}

#[async_trait]
pub trait HrClient: Send + Sync {
    /// Pre-flight credentials/reachability check. A failure here is a
    /// setup error: no record will be attempted.
    async fn check_connection(&self) -> Result<(), HrClientError>;

    /// Creates one attendance document.
    async fn create_attendance(&self, payload: &AttendancePayload) -> Result<(), HrClientError>;

    /// Lists the target system's employees.
    async fn fetch_employees(&self) -> Result<Vec<ExternalEmployee>, HrClientError>;
}

/// Token-authenticated HTTP client for an ERPNext-style REST API.
pub struct HttpHrClient {
    base_url: String,
    auth_header: String,
    http: reqwest::Client,
}

impl HttpHrClient {
    pub fn new(base_url: &str, api_key: &str, api_secret: &str) -> Result<Self, HrClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: format!("token {api_key}:{api_secret}"),
            http,
        })
    }

    fn resource_url(&self, doctype: &str) -> String {
        format!("{}/api/resource/{}", self.base_url, doctype)
    }
}

#[async_trait]
impl HrClient for HttpHrClient {
    async fn check_connection(&self) -> Result<(), HrClientError> {
        let response = self
            .http
            .get(format!("{}?limit=1", self.resource_url("ToDo")))
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .timeout(CONNECT_CHECK_TIMEOUT)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            reqwest::StatusCode::FORBIDDEN => Err(HrClientError::Rejected(
                "connection check failed: invalid API key or secret".to_string(),
            )),
            status => Err(HrClientError::Rejected(format!(
                "connection check failed with status {status}"
            ))),
        }
    }

    async fn create_attendance(&self, payload: &AttendancePayload) -> Result<(), HrClientError> {
        let response = self
            .http
            .post(self.resource_url("Attendance"))
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(HrClientError::Rejected(unwrap_error_message(&body)))
    }

    async fn fetch_employees(&self) -> Result<Vec<ExternalEmployee>, HrClientError> {
        #[derive(Deserialize)]
        struct Envelope {
            data: Vec<ExternalEmployee>,
        }

        let response = self
            .http
            .get(format!(
                "{}?fields=[\"name\",\"company_employee_id\",\"employee_name\"]&limit_page_length=0",
                self.resource_url("Employee")
            ))
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HrClientError::Rejected(unwrap_error_message(&body)));
        }

        let envelope: Envelope = response.json().await?;
        Ok(envelope.data)
    }
}

/// Pulls the human-usable message out of the system's structured error
/// envelope when present, else keeps truncated raw text so the log
/// stays bounded.
fn unwrap_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(exception) = value.get("exception").and_then(|v| v.as_str()) {
            return exception.to_string();
        }
        if let Some(message) = value.get("message").and_then(|v| v.as_str()) {
            return message.to_string();
        }
    }

    let mut text = body.trim().to_string();
    if text.is_empty() {
        text = "request rejected with an empty response body".to_string();
    }
    if text.len() > ERROR_TEXT_LIMIT {
        let mut end = ERROR_TEXT_LIMIT;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_structured_exception() {
        let body = r#"{"exception": "frappe.exceptions.ValidationError: Employee not found", "_server_messages": "..."}"#;
        assert_eq!(
            unwrap_error_message(body),
            "frappe.exceptions.ValidationError: Employee not found"
        );
    }

    #[test]
    fn falls_back_to_message_field() {
        assert_eq!(
            unwrap_error_message(r#"{"message": "Not permitted"}"#),
            "Not permitted"
        );
    }

    #[test]
    fn raw_text_is_truncated() {
        let body = "x".repeat(2000);
        let message = unwrap_error_message(&body);
        assert_eq!(message.len(), ERROR_TEXT_LIMIT);
    }

    #[test]
    fn empty_body_gets_a_placeholder() {
        assert!(!unwrap_error_message("").is_empty());
    }

    #[test]
    fn payload_serializes_for_the_wire() {
        let payload = AttendancePayload {
            employee: "HR-EMP-0001".into(),
            attendance_date: "2025-11-05".into(),
            status: "Absent".into(),
            shift: "Standard".into(),
            docstatus: 1,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["attendance_date"], "2025-11-05");
        assert_eq!(json["docstatus"], 1);
    }
}
