use super::{ProcessedStatus, PunchType};
use crate::errors::{AppError, AppResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Storage format of `attendance_records.timestamp`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// First uid handed out by the store.
pub const UID_START: i64 = 2_000_000;

/// One remote validation failure attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordError {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl RecordError {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// One physical punch event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceRecord {
    pub id: Option<i64>,              // ⇔ attendance_records.id, set once persisted
    pub uid: Option<i64>,             // ⇔ attendance_records.uid, allocated at insert
    pub user_id: i64,                 // device identity at collection time
    pub username: String,             // device label at collection time
    pub timestamp: NaiveDateTime,     // UNIQUE, dedup key against device replays
    pub status: i64,                  // raw device status, passthrough
    pub punch_type: PunchType,
    pub processed: ProcessedStatus,
    pub errors: Vec<RecordError>,     // only when processed = ERROR
    pub created_at: Option<NaiveDateTime>,
}

impl AttendanceRecord {
    /// A fresh, not yet persisted, UNPROCESSED record.
    pub fn new(
        user_id: i64,
        username: impl Into<String>,
        timestamp: NaiveDateTime,
        status: i64,
        punch_type: PunchType,
    ) -> Self {
        Self {
            id: None,
            uid: None,
            user_id,
            username: username.into(),
            timestamp,
            status,
            punch_type,
            processed: ProcessedStatus::Unprocessed,
            errors: Vec::new(),
            created_at: None,
        }
    }

    pub fn mark_as_processed(&mut self) {
        self.processed = ProcessedStatus::Processed;
        self.errors.clear();
    }

    pub fn mark_as_error(&mut self, error: RecordError) {
        self.processed = ProcessedStatus::Error;
        self.errors.push(error);
    }

    pub fn mark_as_unprocessed(&mut self) {
        self.processed = ProcessedStatus::Unprocessed;
        self.errors.clear();
    }

    pub fn is_processed(&self) -> bool {
        self.processed == ProcessedStatus::Processed
    }

    pub fn has_errors(&self) -> bool {
        self.processed == ProcessedStatus::Error && !self.errors.is_empty()
    }

    pub fn timestamp_str(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Parse a timestamp in storage form or in the remote's ISO form
/// (`T` separator, optional fractional seconds, optional trailing `Z`).
pub fn parse_timestamp(raw: &str) -> AppResult<NaiveDateTime> {
    let s = raw.trim().trim_end_matches('Z').replacen('T', " ", 1);

    NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M"))
        .map_err(|_| AppError::InvalidTimestamp(raw.to_string()))
}
