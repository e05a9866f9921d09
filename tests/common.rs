#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::NaiveDateTime;
use punchsync::collab::{PayrollApi, PunchClock};
use punchsync::db::SqliteStore;
use punchsync::engine::{BatchExporter, PollSettings, UploadOrchestrator};
use punchsync::errors::{AppError, AppResult};
use punchsync::export::ExportFormat;
use punchsync::models::record::TIMESTAMP_FORMAT;
use punchsync::models::{
    AttendanceRecord, DeviceUser, Employee, ImportLine, PointingImport, PunchType, RawPunch,
    UploadResponse,
};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub fn ps() -> Command {
    cargo_bin_cmd!("punchsync")
}

/// Fresh store in its own temp dir; keep the dir alive for the test.
pub fn temp_store() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = SqliteStore::open(dir.path().join("punchsync.sqlite")).expect("open store");
    (dir, store)
}

pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).expect("valid timestamp")
}

pub fn record(user_id: i64, when: &str, punch_type: PunchType) -> AttendanceRecord {
    AttendanceRecord::new(user_id, format!("EMP{user_id:03}"), ts(when), 1, punch_type)
}

pub fn punch(user_id: i64, when: &str, code: i64) -> RawPunch {
    RawPunch {
        user_id,
        timestamp: ts(when),
        status: 1,
        punch: code,
    }
}

pub fn fast_poll() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(10),
        timeout: Duration::from_millis(300),
    }
}

pub fn orchestrator(
    store: &SqliteStore,
    api: Arc<FakePayrollApi>,
    export_dir: &Path,
    poll: PollSettings,
) -> UploadOrchestrator {
    let store = Arc::new(store.clone());
    let exporter = BatchExporter::new(store.clone(), export_dir, ExportFormat::Csv);
    UploadOrchestrator::new(api, store.clone(), store, exporter, poll)
}

pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}

/// In-memory punch-clock.
#[derive(Default)]
pub struct FakePunchClock {
    pub users: Mutex<Vec<DeviceUser>>,
    pub punches: Mutex<Vec<RawPunch>>,
    pub pushed: Mutex<Vec<(i64, String)>>,
    pub offline: AtomicBool,
    pub refuse_codes: Mutex<Vec<String>>,
}

impl FakePunchClock {
    pub fn with(users: Vec<DeviceUser>, punches: Vec<RawPunch>) -> Self {
        Self {
            users: Mutex::new(users),
            punches: Mutex::new(punches),
            ..Self::default()
        }
    }

    fn check(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Device("connection refused".into()));
        }
        Ok(())
    }
}

impl PunchClock for FakePunchClock {
    fn get_users(&self) -> AppResult<Vec<DeviceUser>> {
        self.check()?;
        Ok(self.users.lock().unwrap().clone())
    }

    fn get_attendance_records(&self) -> AppResult<Vec<RawPunch>> {
        self.check()?;
        Ok(self.punches.lock().unwrap().clone())
    }

    fn set_user(&self, id: i64, code: &str) -> AppResult<bool> {
        self.check()?;
        if self.refuse_codes.lock().unwrap().iter().any(|c| c == code) {
            return Ok(false);
        }
        self.pushed.lock().unwrap().push((id, code.to_string()));
        self.users.lock().unwrap().push(DeviceUser {
            user_id: id,
            name: code.to_string(),
        });
        Ok(true)
    }

    fn clear_attendance(&self) -> AppResult<bool> {
        self.check()?;
        self.punches.lock().unwrap().clear();
        Ok(true)
    }
}

/// Scripted payroll API.
///
/// `statuses` are served in order; the last one repeats.
#[derive(Default)]
pub struct FakePayrollApi {
    pub upload: Mutex<Option<Result<UploadResponse, String>>>,
    pub statuses: Mutex<VecDeque<PointingImport>>,
    pub accepted: Mutex<Vec<String>>,
    pub lines: Mutex<Vec<ImportLine>>,
    pub employees: Mutex<Vec<Employee>>,
    pub uploaded: Mutex<Vec<PathBuf>>,
    pub polls: AtomicUsize,
    pub line_fetches: AtomicUsize,
    pub job_queries: Mutex<Vec<String>>,
    pub poll_error: AtomicBool,
}

impl FakePayrollApi {
    pub fn accepting(job_id: &str, statuses: &[&str]) -> Self {
        let api = Self::default();
        *api.upload.lock().unwrap() = Some(Ok(UploadResponse::accepted(job_id)));
        *api.statuses.lock().unwrap() = statuses
            .iter()
            .map(|s| PointingImport::with_status(s, Some(job_id)))
            .collect();
        api
    }

    pub fn accept_timestamps(&self, timestamps: &[&str]) {
        *self.accepted.lock().unwrap() = timestamps.iter().map(|s| s.to_string()).collect();
    }
}

impl PayrollApi for FakePayrollApi {
    fn authenticate(&self) -> AppResult<bool> {
        Ok(true)
    }

    fn upload_attendance(&self, artifact_path: &Path) -> AppResult<UploadResponse> {
        self.uploaded.lock().unwrap().push(artifact_path.to_path_buf());
        match self.upload.lock().unwrap().clone() {
            Some(Ok(r)) => Ok(r),
            Some(Err(msg)) => Err(AppError::Network(msg)),
            None => Err(AppError::Network("no upload response scripted".into())),
        }
    }

    fn get_employees(&self) -> AppResult<Vec<Employee>> {
        Ok(self.employees.lock().unwrap().clone())
    }

    fn get_pointing_import(&self) -> AppResult<PointingImport> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        if self.poll_error.load(Ordering::SeqCst) {
            return Err(AppError::Network("status endpoint unreachable".into()));
        }
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            Ok(statuses.pop_front().unwrap_or_default())
        } else {
            Ok(statuses.front().cloned().unwrap_or_default())
        }
    }

    fn get_pointing_import_lines(&self) -> AppResult<Vec<ImportLine>> {
        self.line_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.lines.lock().unwrap().clone())
    }

    fn get_pointings_with_job_id(&self, job_id: &str) -> AppResult<Vec<String>> {
        self.job_queries.lock().unwrap().push(job_id.to_string());
        Ok(self.accepted.lock().unwrap().clone())
    }
}

pub fn employee(id: Option<i64>, code: Option<&str>) -> Employee {
    Employee {
        id,
        code: code.map(str::to_string),
        ..Employee::default()
    }
}
