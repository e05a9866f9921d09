use crate::collab::PunchClock;
use crate::db::AttendanceRepository;
use crate::errors::AppResult;
use crate::models::{AttendanceRecord, PunchType, RawPunch};
use crate::scheduler::JobReport;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// Pulls the device attendance log into the record store.
pub struct CollectionCoordinator {
    device: Arc<dyn PunchClock>,
    records: Arc<dyn AttendanceRepository>,
}

impl CollectionCoordinator {
    pub fn new(device: Arc<dyn PunchClock>, records: Arc<dyn AttendanceRepository>) -> Self {
        Self { device, records }
    }

    /// Read users and punches from the device and store the new punches.
    ///
    /// Returns the number of records actually inserted; replays of punches
    /// already stored are absorbed by the store.
    pub fn try_collect(&self) -> AppResult<usize> {
        let labels: HashMap<i64, String> = self
            .device
            .get_users()?
            .into_iter()
            .map(|u| (u.user_id, u.name))
            .collect();

        let punches = self.device.get_attendance_records()?;
        if punches.is_empty() {
            info!("No attendance records to collect");
            return Ok(0);
        }

        let mut records: Vec<AttendanceRecord> =
            punches.iter().map(|p| normalize(p, &labels)).collect();

        let inserted = self.records.save_records(&mut records)?;
        info!(
            "Collected {} punches from device, {inserted} new",
            punches.len()
        );
        Ok(inserted)
    }

    /// Like [`try_collect`](Self::try_collect), but an unreachable device
    /// counts as zero collected. Store failures still propagate.
    pub fn collect_attendance(&self) -> AppResult<usize> {
        match self.try_collect() {
            Ok(n) => Ok(n),
            Err(e) if e.is_retryable() => {
                warn!("Attendance collection skipped ({}): {e}", e.kind());
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    pub fn run_job(&self) -> AppResult<JobReport> {
        let n = self.collect_attendance()?;
        Ok(JobReport::ok(n, format!("{n} new punches collected")))
    }
}

fn normalize(punch: &RawPunch, labels: &HashMap<i64, String>) -> AttendanceRecord {
    let username = labels
        .get(&punch.user_id)
        .cloned()
        .unwrap_or_else(|| format!("Unknown-{}", punch.user_id));

    AttendanceRecord::new(
        punch.user_id,
        username,
        punch.timestamp,
        punch.status,
        PunchType::from_device_code(punch.punch),
    )
}
