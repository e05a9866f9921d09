use crate::db::{AttendanceRepository, RecordOrder};
use crate::errors::AppResult;
use crate::export::{BatchRow, ExportFormat, write_artifact};
use crate::models::{AttendanceRecord, ProcessedStatus};
use chrono::Local;
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// One materialized batch, ready to ship.
#[derive(Debug, Clone)]
pub struct ExportBatch {
    pub batch_id: String,
    pub artifact_path: PathBuf,
    pub records_count: usize,
    pub records: Vec<AttendanceRecord>,
}

/// Selects the UNPROCESSED records and writes them as one artifact.
///
/// There is no in-flight marking: a record stays selectable until the
/// remote outcome is reconciled, so two overlapping calls can put the same
/// record in two batches.
pub struct BatchExporter {
    records: Arc<dyn AttendanceRepository>,
    export_dir: PathBuf,
    format: ExportFormat,
}

impl BatchExporter {
    pub fn new(
        records: Arc<dyn AttendanceRepository>,
        export_dir: impl Into<PathBuf>,
        format: ExportFormat,
    ) -> Self {
        Self {
            records,
            export_dir: export_dir.into(),
            format,
        }
    }

    /// `Ok(None)` when nothing is pending; no file is created then.
    pub fn export_batch(&self) -> AppResult<Option<ExportBatch>> {
        let pending = self
            .records
            .get_records(Some(ProcessedStatus::Unprocessed), RecordOrder::Timestamp)?;

        if pending.is_empty() {
            info!("No unprocessed attendance records to export");
            return Ok(None);
        }

        fs::create_dir_all(&self.export_dir)?;

        let batch_id = new_batch_id();
        let file_name = format!(
            "attendance_{}_{batch_id}.{}",
            Local::now().format("%Y%m%d%H%M%S"),
            self.format.extension()
        );
        let artifact_path = self.export_dir.join(file_name);

        let rows: Vec<BatchRow> = pending.iter().map(BatchRow::from).collect();
        write_artifact(self.format, &rows, &artifact_path)?;

        info!(
            "Created batch {batch_id} with {} records at {}",
            pending.len(),
            artifact_path.display()
        );

        Ok(Some(ExportBatch {
            batch_id,
            artifact_path,
            records_count: pending.len(),
            records: pending,
        }))
    }
}

fn new_batch_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
