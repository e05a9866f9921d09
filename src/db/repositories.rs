//! Record Store contract.
//!
//! Components depend on these traits; `SqliteStore` is the production
//! implementation.

use crate::errors::AppResult;
use crate::models::{ApiUploadLog, AttendanceRecord, ProcessedStatus, RecordError, SyncConfig};

/// Sort key accepted by [`AttendanceRepository::get_records`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordOrder {
    #[default]
    Timestamp,
    Uid,
    Id,
    CreatedAt,
}

impl RecordOrder {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            RecordOrder::Timestamp => "timestamp",
            RecordOrder::Uid => "uid",
            RecordOrder::Id => "id",
            RecordOrder::CreatedAt => "created_at",
        }
    }
}

pub trait AttendanceRepository: Send + Sync {
    /// Records, optionally filtered by status, ascending by `order`.
    fn get_records(
        &self,
        processed: Option<ProcessedStatus>,
        order: RecordOrder,
    ) -> AppResult<Vec<AttendanceRecord>>;

    fn get_record(&self, id: i64) -> AppResult<Option<AttendanceRecord>>;

    /// Insert one record, ignoring it if its timestamp is already stored.
    /// The returned copy carries `id`/`uid` only when it was inserted.
    fn save_record(&self, record: AttendanceRecord) -> AppResult<AttendanceRecord>;

    /// Bulk insert-or-ignore keyed on `timestamp`. Returns inserted rows.
    fn save_records(&self, records: &mut [AttendanceRecord]) -> AppResult<usize>;

    fn update_record(&self, record: &AttendanceRecord) -> AppResult<()>;

    fn delete_record(&self, id: i64) -> AppResult<()>;

    fn delete_records(&self, ids: &[i64]) -> AppResult<usize>;

    /// Set `status` (and clear errors) on every record whose timestamp is
    /// listed. Idempotent. Returns matched rows.
    fn mark_records_by_timestamps(
        &self,
        timestamps: &[String],
        status: ProcessedStatus,
    ) -> AppResult<usize>;

    fn mark_records_by_ids(&self, ids: &[i64], status: ProcessedStatus) -> AppResult<usize>;

    /// Atomically set `processed = ERROR` and the error list.
    /// Returns false when no record has this id.
    fn mark_record_error(&self, id: i64, errors: &[RecordError]) -> AppResult<bool>;
}

pub trait UploadLogRepository: Send + Sync {
    fn log_api_upload(&self, log: &ApiUploadLog) -> AppResult<i64>;

    /// Most recent first.
    fn get_api_logs(&self, limit: usize) -> AppResult<Vec<ApiUploadLog>>;
}

pub trait ConfigRepository: Send + Sync {
    fn get_config(&self) -> AppResult<Option<SyncConfig>>;

    fn save_config(&self, config: &SyncConfig) -> AppResult<()>;
}
