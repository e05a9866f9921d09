use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reconciliation state of an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessedStatus {
    Unprocessed,
    Processed,
    Error,
}

impl ProcessedStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProcessedStatus::Unprocessed => "UNPROCESSED",
            ProcessedStatus::Processed => "PROCESSED",
            ProcessedStatus::Error => "ERROR",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "UNPROCESSED" => Some(ProcessedStatus::Unprocessed),
            "PROCESSED" => Some(ProcessedStatus::Processed),
            "ERROR" => Some(ProcessedStatus::Error),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl FromStr for ProcessedStatus {
    type Err = AppError;

    /// Case-insensitive, used by the CLI.
    fn from_str(s: &str) -> AppResult<Self> {
        Self::from_db_str(&s.trim().to_ascii_uppercase())
            .ok_or_else(|| AppError::InvalidStatus(s.to_string()))
    }
}
