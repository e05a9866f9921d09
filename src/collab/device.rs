use crate::errors::AppResult;
use crate::models::{DeviceUser, RawPunch};

/// The physical punch-clock.
///
/// Implementations report transport or protocol failures as
/// `AppError::Device`. Calls block until the device answers.
pub trait PunchClock: Send + Sync {
    /// Users currently registered on the device.
    fn get_users(&self) -> AppResult<Vec<DeviceUser>>;

    /// The full attendance log. The device does not clear it between reads.
    fn get_attendance_records(&self) -> AppResult<Vec<RawPunch>>;

    /// Register (or overwrite) a user; `code` goes in the device name slot.
    fn set_user(&self, id: i64, code: &str) -> AppResult<bool>;

    fn clear_attendance(&self) -> AppResult<bool>;
}
