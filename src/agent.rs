//! Composition root: builds the engine once and wires it into the scheduler.

use crate::collab::{PayrollApi, PunchClock};
use crate::config::AppConfig;
use crate::db::{AttendanceRepository, ConfigRepository, SqliteStore, UploadLogRepository};
use crate::engine::{
    BatchExporter, CollectionCoordinator, PollSettings, UploadOrchestrator, UploadOutcome,
    UserImportCoordinator,
};
use crate::errors::{AppError, AppResult};
use crate::models::SyncConfig;
use crate::scheduler::{
    ATTENDANCE_COLLECTION, ATTENDANCE_UPLOAD, JobDescriptor, JobStatus, Scheduler, TaskHandle,
    TaskQueue, USER_IMPORT,
};
use log::{info, warn};
use std::sync::Arc;

/// The running synchronization agent.
///
/// The host process supplies the device and API collaborators; everything
/// else is built from the settings file and the configuration row.
pub struct SyncAgent {
    config: Arc<SyncConfig>,
    api: Arc<dyn PayrollApi>,
    upload: Arc<UploadOrchestrator>,
    scheduler: Scheduler,
    queue: TaskQueue,
}

impl SyncAgent {
    /// Read the configuration row from `store` and build the agent.
    pub fn new(
        app: &AppConfig,
        store: SqliteStore,
        device: Arc<dyn PunchClock>,
        api: Arc<dyn PayrollApi>,
    ) -> AppResult<Self> {
        let config = store.get_config()?.ok_or_else(|| {
            AppError::Config("no configuration row found; set one with `punchsync config --set`".into())
        })?;
        Self::with_config(app, store, config, device, api)
    }

    pub fn with_config(
        app: &AppConfig,
        store: SqliteStore,
        config: SyncConfig,
        device: Arc<dyn PunchClock>,
        api: Arc<dyn PayrollApi>,
    ) -> AppResult<Self> {
        let config = Arc::new(config);
        let store = Arc::new(store);
        let records: Arc<dyn AttendanceRepository> = store.clone();
        let logs: Arc<dyn UploadLogRepository> = store;

        let collection = Arc::new(CollectionCoordinator::new(
            Arc::clone(&device),
            Arc::clone(&records),
        ));
        let exporter = BatchExporter::new(
            Arc::clone(&records),
            crate::utils::path::expand_tilde(&app.export_dir),
            app.export_format,
        );
        let upload = Arc::new(UploadOrchestrator::new(
            Arc::clone(&api),
            records,
            logs,
            exporter,
            PollSettings {
                interval: app.poll_interval(),
                timeout: app.poll_timeout(),
            },
        ));
        let user_import = Arc::new(UserImportCoordinator::new(Arc::clone(&api), device));

        let scheduler = Scheduler::new(Some(Arc::clone(&config)), app.tick());
        scheduler.register_job(
            ATTENDANCE_COLLECTION,
            Arc::new(JobDescriptor::new(collection, CollectionCoordinator::run_job)),
            None,
            None,
        )?;
        scheduler.register_job(
            ATTENDANCE_UPLOAD,
            Arc::new(JobDescriptor::new(Arc::clone(&upload), UploadOrchestrator::run_job)),
            None,
            None,
        )?;
        scheduler.register_job(
            USER_IMPORT,
            Arc::new(JobDescriptor::new(user_import, UserImportCoordinator::run_job)),
            None,
            None,
        )?;

        Ok(Self {
            config,
            api,
            upload,
            scheduler,
            queue: TaskQueue::new()?,
        })
    }

    /// Authenticate and start the periodic loop.
    pub fn start(&self) -> AppResult<()> {
        match self.api.authenticate() {
            Ok(true) => info!("Authenticated against payroll API"),
            Ok(false) => warn!("Payroll API refused the credentials; uploads will keep retrying"),
            Err(e) => warn!("Payroll API authentication failed ({}): {e}", e.kind()),
        }
        self.scheduler.start()
    }

    pub fn stop(&self) {
        self.scheduler.stop();
        self.queue.shutdown();
    }

    /// Run a registered job on the task queue.
    pub fn trigger(&self, name: &str) -> AppResult<TaskHandle> {
        if self.scheduler.get_job_status(name).is_none() {
            return Err(AppError::JobNotFound(name.to_string()));
        }
        let scheduler = self.scheduler.clone();
        let job = name.to_string();
        self.queue.submit(name, move || scheduler.run_job_now(&job))
    }

    /// Upload immediately on the calling thread.
    pub fn upload_now(&self) -> AppResult<UploadOutcome> {
        self.scheduler
            .run_exclusive(|| self.upload.upload_attendance_to_api())
    }

    pub fn job_statuses(&self) -> Vec<JobStatus> {
        self.scheduler.get_all_job_statuses()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }
}

impl Drop for SyncAgent {
    fn drop(&mut self) {
        self.scheduler.stop();
    }
}
