use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A user registered on the punch-clock.
///
/// The device keeps the payroll employee code in its `name` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceUser {
    pub user_id: i64,
    pub name: String,
}

/// A punch as read from the device log, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPunch {
    pub user_id: i64,
    pub timestamp: NaiveDateTime,
    pub status: i64,
    pub punch: i64,
}
