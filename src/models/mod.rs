//! Domain models shared by the store, the collaborators and the sync engine.

pub mod device;
pub mod error_code;
pub mod punch_type;
pub mod record;
pub mod remote;
pub mod status;
pub mod sync_config;
pub mod upload_log;

pub use device::{DeviceUser, RawPunch};
pub use punch_type::PunchType;
pub use record::{AttendanceRecord, RecordError};
pub use remote::{Employee, ImportLine, ImportState, PointingImport, UploadResponse};
pub use status::ProcessedStatus;
pub use sync_config::SyncConfig;
pub use upload_log::{ApiUploadLog, UploadStatus};
