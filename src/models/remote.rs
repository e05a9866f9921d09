//! Payloads exchanged with the payroll API collaborator.

use super::RecordError;
use serde::{Deserialize, Serialize};

/// Minimal employee entry from the remote directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Employee {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, rename = "lastName")]
    pub last_name: Option<String>,
}

/// Answer of the artifact upload call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default)]
    pub job_execution_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl UploadResponse {
    pub fn accepted(job_execution_id: impl Into<String>) -> Self {
        Self {
            success: true,
            job_execution_id: Some(job_execution_id.into()),
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            job_execution_id: None,
            message: Some(message.into()),
        }
    }
}

/// Status of the most recent asynchronous import on the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PointingImport {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub job_execution_id: Option<String>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub written: Option<i64>,
    #[serde(default)]
    pub skipped: Option<i64>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
}

impl PointingImport {
    pub fn with_status(status: &str, job_execution_id: Option<&str>) -> Self {
        Self {
            status: Some(status.to_string()),
            job_execution_id: job_execution_id.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn state(&self) -> ImportState {
        ImportState::parse(self.status.as_deref().unwrap_or(""))
    }
}

/// Remote job status, as far as the poll loop cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportState {
    Starting,
    Started,
    Completed,
    Failed,
    Stopped,
    Other(String),
}

impl ImportState {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "STARTING" => ImportState::Starting,
            "STARTED" => ImportState::Started,
            "COMPLETED" => ImportState::Completed,
            "FAILED" => ImportState::Failed,
            "STOPPED" => ImportState::Stopped,
            _ => ImportState::Other(s.to_string()),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, ImportState::Starting | ImportState::Started)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ImportState::Failed | ImportState::Stopped)
    }
}

/// One failed line of the latest import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImportLine {
    #[serde(default)]
    pub record_id: Option<i64>,
    #[serde(default)]
    pub errors: Vec<RecordError>,
}
