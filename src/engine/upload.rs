use crate::collab::PayrollApi;
use crate::db::{AttendanceRepository, UploadLogRepository};
use crate::engine::exporter::{BatchExporter, ExportBatch};
use crate::engine::reconcile::ErrorReconciler;
use crate::errors::{AppError, AppResult, ErrorKind};
use crate::models::{ApiUploadLog, ImportState, PointingImport, ProcessedStatus, UploadStatus};
use crate::scheduler::JobReport;
use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Bounds of the remote status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Result of one upload cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadOutcome {
    pub success: bool,
    pub message: String,
    pub processed: usize,
    pub job_execution_id: Option<String>,
    #[serde(skip)]
    pub kind: Option<ErrorKind>,
}

impl UploadOutcome {
    fn nothing_to_upload() -> Self {
        Self {
            success: true,
            message: "No records to upload".into(),
            processed: 0,
            job_execution_id: None,
            kind: None,
        }
    }

    fn completed(processed: usize, job_execution_id: Option<String>) -> Self {
        Self {
            success: true,
            message: format!("Successfully processed {processed} records"),
            processed,
            job_execution_id,
            kind: None,
        }
    }

    fn failed(kind: ErrorKind, message: impl Into<String>, job_execution_id: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            processed: 0,
            job_execution_id,
            kind: Some(kind),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            Some(ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Store)
        )
    }
}

/// Ships one batch and reflects the remote outcome into the store.
pub struct UploadOrchestrator {
    api: Arc<dyn PayrollApi>,
    records: Arc<dyn AttendanceRepository>,
    logs: Arc<dyn UploadLogRepository>,
    exporter: BatchExporter,
    reconciler: ErrorReconciler,
    poll: PollSettings,
}

impl UploadOrchestrator {
    pub fn new(
        api: Arc<dyn PayrollApi>,
        records: Arc<dyn AttendanceRepository>,
        logs: Arc<dyn UploadLogRepository>,
        exporter: BatchExporter,
        poll: PollSettings,
    ) -> Self {
        let reconciler = ErrorReconciler::new(Arc::clone(&api), Arc::clone(&records));
        Self {
            api,
            records,
            logs,
            exporter,
            reconciler,
            poll,
        }
    }

    /// Export, submit, poll, reconcile.
    ///
    /// Store failures before submission propagate; everything that goes
    /// wrong once the batch is in flight is reported in the outcome.
    pub fn upload_attendance_to_api(&self) -> AppResult<UploadOutcome> {
        // 1) Batch
        let Some(batch) = self.exporter.export_batch()? else {
            info!("No unprocessed attendance records to upload");
            return Ok(UploadOutcome::nothing_to_upload());
        };

        // 2) Submit
        let response = match self.api.upload_attendance(&batch.artifact_path) {
            Ok(r) if r.success => r,
            Ok(r) => {
                let message = r.message.clone().unwrap_or_else(|| "Unknown error".into());
                error!("Upload of batch {} rejected: {message}", batch.batch_id);
                self.log_attempt(&batch, UploadStatus::Failed, Some(serde_json::to_value(&r)?))?;
                return Ok(UploadOutcome::failed(ErrorKind::Validation, message, None));
            }
            Err(e) => {
                error!("Upload of batch {} failed ({}): {e}", batch.batch_id, e.kind());
                self.log_attempt(
                    &batch,
                    UploadStatus::Failed,
                    Some(json!({ "success": false, "message": e.to_string() })),
                )?;
                return Ok(UploadOutcome::failed(e.kind(), e.to_string(), None));
            }
        };

        let job_execution_id = response.job_execution_id;
        info!(
            "Batch {} submitted, job execution {}",
            batch.batch_id,
            job_execution_id.as_deref().unwrap_or("<none>")
        );

        // 3) Poll + reconcile
        match self.await_import(&batch, job_execution_id.as_deref()) {
            Ok(processed) => Ok(UploadOutcome::completed(processed, job_execution_id)),
            Err(e) => {
                error!("Batch {} not confirmed ({}): {e}", batch.batch_id, e.kind());
                Ok(UploadOutcome::failed(e.kind(), e.to_string(), job_execution_id))
            }
        }
    }

    pub fn run_job(&self) -> AppResult<JobReport> {
        let outcome = self.upload_attendance_to_api()?;
        Ok(JobReport {
            success: outcome.success,
            processed: outcome.processed,
            summary: outcome.message,
        })
    }

    /// Poll the remote import until it settles or the timeout elapses.
    fn await_import(&self, batch: &ExportBatch, job_execution_id: Option<&str>) -> AppResult<usize> {
        let deadline = Instant::now() + self.poll.timeout;

        loop {
            let import = self.api.get_pointing_import()?;

            match import.state() {
                ImportState::Completed => {
                    info!("Pointing import completed");
                    return self.complete(batch, &import, job_execution_id);
                }
                ImportState::Failed | ImportState::Stopped => {
                    let status = import.status.clone().unwrap_or_default();
                    error!("Pointing import ended with status {status}");
                    self.log_attempt(batch, UploadStatus::Failed, Some(serde_json::to_value(&import)?))?;
                    self.reconcile_errors();
                    return Err(AppError::Validation(format!("remote import {status}")));
                }
                ImportState::Starting | ImportState::Started => {
                    debug!("Pointing import still in progress");
                }
                ImportState::Other(status) => {
                    warn!("Unknown import status: {status:?}");
                }
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(self.poll.interval.min(deadline - now));
        }

        warn!(
            "Timeout reached waiting for pointing import of batch {}",
            batch.batch_id
        );
        Err(AppError::Timeout(self.poll.timeout))
    }

    fn complete(
        &self,
        batch: &ExportBatch,
        import: &PointingImport,
        job_execution_id: Option<&str>,
    ) -> AppResult<usize> {
        let job_id = match (import.job_execution_id.as_deref(), job_execution_id) {
            (Some(remote), Some(ours)) if remote != ours => {
                warn!("Latest import reports job {remote}, batch was submitted as {ours}");
                remote
            }
            (Some(remote), _) => remote,
            (None, Some(ours)) => ours,
            (None, None) => {
                return Err(AppError::Validation(
                    "completed import carries no job execution id".into(),
                ));
            }
        };

        let accepted = self.api.get_pointings_with_job_id(job_id)?;
        let processed = accepted.len();

        if !accepted.is_empty() {
            self.records
                .mark_records_by_timestamps(&accepted, ProcessedStatus::Processed)?;
        }

        if processed < batch.records_count {
            info!(
                "{processed} of {} records accepted, fetching failed lines",
                batch.records_count
            );
            self.reconcile_errors();
        }

        self.log_attempt(
            batch,
            UploadStatus::Success,
            Some(json!({ "jobExecutionId": job_id, "processed": processed })),
        )?;

        Ok(processed)
    }

    /// Failures here only leave records UNPROCESSED for a later batch.
    fn reconcile_errors(&self) -> usize {
        match self.reconciler.reconcile() {
            Ok(n) => n,
            Err(e) => {
                error!("Error processing failed records ({}): {e}", e.kind());
                0
            }
        }
    }

    fn log_attempt(
        &self,
        batch: &ExportBatch,
        status: UploadStatus,
        response: Option<Value>,
    ) -> AppResult<()> {
        let log = ApiUploadLog::new(
            batch.batch_id.clone(),
            batch.artifact_path.to_string_lossy(),
            batch.records_count,
            status,
            response,
        );
        self.logs.log_api_upload(&log)?;
        Ok(())
    }
}
