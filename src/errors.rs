//! Unified application error type.
//! Every module (db, engine, scheduler, cli) returns AppError.

use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Serialization
    // ---------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid processed status: {0}")]
    InvalidStatus(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid interval unit: {0}")]
    InvalidIntervalUnit(String),

    // ---------------------------
    // Collaborators
    // ---------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Device error: {0}")]
    Device(String),

    #[error("Remote validation error: {0}")]
    Validation(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    // ---------------------------
    // Scheduler
    // ---------------------------
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Task cancelled: {0}")]
    Cancelled(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Coarse classification of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Device,
    Validation,
    Timeout,
    Store,
    Config,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Device => "device",
            ErrorKind::Validation => "validation",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Store => "store",
            ErrorKind::Config => "config",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Network(_) => ErrorKind::Network,
            AppError::Device(_) => ErrorKind::Device,
            AppError::Validation(_)
            | AppError::InvalidInput(_)
            | AppError::InvalidStatus(_)
            | AppError::InvalidTimestamp(_) => {
                ErrorKind::Validation
            }
            AppError::Timeout(_) => ErrorKind::Timeout,
            AppError::Db(_) | AppError::Migration(_) => ErrorKind::Store,
            AppError::Config(_) | AppError::Yaml(_) | AppError::InvalidIntervalUnit(_) => {
                ErrorKind::Config
            }
            AppError::Io(_)
            | AppError::Json(_)
            | AppError::Csv(_)
            | AppError::JobNotFound(_)
            | AppError::Cancelled(_)
            | AppError::Export(_)
            | AppError::Other(_) => ErrorKind::Internal,
        }
    }

    /// True when the same operation may succeed on a later tick.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Network(_) | AppError::Device(_) | AppError::Timeout(_) => true,
            AppError::Db(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}
