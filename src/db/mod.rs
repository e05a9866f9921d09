pub mod config_repo;
pub mod initialize;
pub mod migrate;
pub mod pool;
pub mod records;
pub mod repositories;
pub mod store;
pub mod upload_logs;

pub use repositories::{AttendanceRepository, ConfigRepository, RecordOrder, UploadLogRepository};
pub use store::SqliteStore;
