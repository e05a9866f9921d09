// src/export/model.rs

use crate::models::AttendanceRecord;
use serde::Serialize;

/// Column names the payroll importer reads.
pub const HEADERS: [&str; 5] = ["code", "Nom", "time", "type", "recordId"];

/// Flat row of a batch artifact.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct BatchRow {
    pub employee_code: String,
    pub display_name: String,
    pub timestamp: String,
    pub punch_type_label: String,
    pub record_id: Option<i64>,
}

impl From<&AttendanceRecord> for BatchRow {
    fn from(r: &AttendanceRecord) -> Self {
        Self {
            employee_code: r.username.clone(),
            // the importer resolves names from the code
            display_name: String::new(),
            timestamp: r.timestamp_str(),
            punch_type_label: r.punch_type.label().to_string(),
            record_id: r.id,
        }
    }
}

impl BatchRow {
    /// Cells in `HEADERS` order.
    pub(crate) fn cells(&self) -> [String; 5] {
        [
            self.employee_code.clone(),
            self.display_name.clone(),
            self.timestamp.clone(),
            self.punch_type_label.clone(),
            self.record_id.map(|id| id.to_string()).unwrap_or_default(),
        ]
    }
}
