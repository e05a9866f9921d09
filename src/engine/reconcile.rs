use crate::collab::PayrollApi;
use crate::db::AttendanceRepository;
use crate::errors::AppResult;
use log::{debug, info};
use std::sync::Arc;

/// Attributes remote validation failures to individual records.
pub struct ErrorReconciler {
    api: Arc<dyn PayrollApi>,
    records: Arc<dyn AttendanceRepository>,
}

impl ErrorReconciler {
    pub fn new(api: Arc<dyn PayrollApi>, records: Arc<dyn AttendanceRepository>) -> Self {
        Self { api, records }
    }

    /// Mark every record named by the latest import's failed lines as
    /// ERROR. Records not named keep their current state.
    pub fn reconcile(&self) -> AppResult<usize> {
        let lines = self.api.get_pointing_import_lines()?;
        let mut marked = 0;

        for line in &lines {
            let Some(record_id) = line.record_id else {
                debug!("Ignoring failed line without record id");
                continue;
            };
            if line.errors.is_empty() {
                continue;
            }

            if self.records.mark_record_error(record_id, &line.errors)? {
                marked += 1;
            }
        }

        info!("Reconciled {} failed lines, {marked} records marked ERROR", lines.len());
        Ok(marked)
    }
}
