use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UploadStatus {
    Success,
    Failed,
}

impl UploadStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            UploadStatus::Success => "SUCCESS",
            UploadStatus::Failed => "FAILED",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "SUCCESS" => Some(UploadStatus::Success),
            "FAILED" => Some(UploadStatus::Failed),
            _ => None,
        }
    }
}

/// Immutable audit row written once per upload attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ApiUploadLog {
    pub id: Option<i64>,
    pub batch_id: String,
    pub artifact_path: String,
    pub records_count: usize,
    pub status: UploadStatus,
    pub response_data: Option<Value>,
    pub created_at: Option<NaiveDateTime>,
}

impl ApiUploadLog {
    pub fn new(
        batch_id: impl Into<String>,
        artifact_path: impl Into<String>,
        records_count: usize,
        status: UploadStatus,
        response_data: Option<Value>,
    ) -> Self {
        Self {
            id: None,
            batch_id: batch_id.into(),
            artifact_path: artifact_path.into(),
            records_count,
            status,
            response_data,
            created_at: None,
        }
    }
}
