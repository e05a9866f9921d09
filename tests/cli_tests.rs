mod common;
use common::{ps, record};
use predicates::prelude::*;
use predicates::str::contains;
use punchsync::db::{AttendanceRepository, SqliteStore, UploadLogRepository};
use punchsync::models::{ApiUploadLog, ProcessedStatus, PunchType, RecordError, UploadStatus};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Env {
    dir: TempDir,
    config: String,
    db: String,
}

impl Env {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = dir.path().join("punchsync.conf");
        let db = dir.path().join("punchsync.sqlite");
        fs::write(
            &config,
            format!(
                "export_dir: {}\nexport_format: csv\nlog_level: warn\n",
                dir.path().join("exports").display()
            ),
        )
        .expect("write settings");

        Self {
            config: config.to_string_lossy().to_string(),
            db: db.to_string_lossy().to_string(),
            dir,
        }
    }

    fn cmd(&self, args: &[&str]) -> assert_cmd::Command {
        let mut cmd = ps();
        cmd.args(["--config", &self.config, "--db", &self.db]).args(args);
        cmd
    }

    fn store(&self) -> SqliteStore {
        SqliteStore::open(&self.db).expect("open store")
    }

    fn exports(&self) -> PathBuf {
        self.dir.path().join("exports")
    }
}

fn init(env: &Env) {
    env.cmd(&["init"])
        .assert()
        .success()
        .stdout(contains("initialization completed"));
}

#[test]
fn test_init_creates_database_and_config_row() {
    let env = Env::new();
    init(&env);

    assert!(Path::new(&env.db).exists());
    env.cmd(&["config", "--print"])
        .assert()
        .success()
        .stdout(contains("device_port: 4370"))
        .stdout(contains("upload_interval: 1"));
}

#[test]
fn test_init_writes_missing_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested").join("punchsync.conf");
    let db = dir.path().join("db.sqlite");

    ps().args([
        "--config",
        &config.to_string_lossy(),
        "--db",
        &db.to_string_lossy(),
        "init",
    ])
    .assert()
    .success()
    .stdout(contains("Settings file created"));

    let written = fs::read_to_string(&config).unwrap();
    assert!(written.contains("poll_timeout_secs: 30"));
}

#[test]
fn test_config_set_masks_secrets() {
    let env = Env::new();
    init(&env);

    env.cmd(&[
        "config",
        "--set",
        "company_id=ACME",
        "--set",
        "device_ip=10.0.0.8",
        "--set",
        "api_password=hunter2",
        "--set",
        "upload_interval=5",
    ])
    .assert()
    .success()
    .stdout(contains("company_id: ACME"))
    .stdout(contains("********"))
    .stdout(contains("hunter2").not());

    env.cmd(&["jobs"])
        .assert()
        .success()
        .stdout(contains("attendance_upload"))
        .stdout(contains("5 minutes"))
        .stdout(contains("60 minutes"));

    env.cmd(&["config", "--set", "upload_interval=soon"])
        .assert()
        .failure()
        .stderr(contains("positive integer"));
    env.cmd(&["config", "--set", "no-equals-sign"]).assert().failure();
}

#[test]
fn test_config_set_rejects_unusable_rows() {
    let env = Env::new();
    init(&env);

    env.cmd(&["config", "--set", "upload_interval=3"])
        .assert()
        .failure()
        .stderr(contains("company_id"))
        .stderr(contains("device_ip"));

    env.cmd(&[
        "config",
        "--set",
        "company_id=ACME",
        "--set",
        "device_ip=10.0.0.8",
        "--set",
        "upload_interval=0",
    ])
    .assert()
    .failure()
    .stderr(contains("positive integer"));

    // nothing was saved by the rejected calls
    env.cmd(&["config", "--print"])
        .assert()
        .success()
        .stdout(contains("upload_interval: 1"))
        .stdout(contains("ACME").not());
}

#[test]
fn test_add_and_edit_records() {
    let env = Env::new();
    init(&env);

    env.cmd(&[
        "add", "--user", "7", "--name", "Ada", "--time", "2025-02-03 08:01:00", "--type", "in",
    ])
    .assert()
    .success()
    .stdout(contains("uid 2000000"));

    env.cmd(&[
        "add", "--user", "7", "--time", "2025-02-03T08:01:00", "--type", "out",
    ])
    .assert()
    .success()
    .stdout(contains("already stored"));

    env.cmd(&["add", "--user", "7", "--time", "yesterday", "--type", "in"])
        .assert()
        .failure();
    env.cmd(&["add", "--user", "7", "--time", "2025-02-03 09:00:00", "--type", "lunch"])
        .assert()
        .failure();

    let store = env.store();
    let records = store.get_records(None, Default::default()).unwrap();
    assert_eq!(records.len(), 1);
    let id = records[0].id.unwrap();
    assert_eq!(records[0].punch_type, PunchType::In);
    store
        .mark_record_error(id, &[RecordError::new("time", "E360", "")])
        .unwrap();

    let id_arg = id.to_string();
    env.cmd(&[
        "edit", &id_arg, "--time", "2025-02-03 17:30:00", "--type", "out", "--status",
        "unprocessed",
    ])
    .assert()
    .success()
    .stdout(contains(format!("Record {id} updated")));

    let edited = store.get_record(id).unwrap().unwrap();
    assert_eq!(edited.timestamp_str(), "2025-02-03 17:30:00");
    assert_eq!(edited.punch_type, PunchType::Out);
    assert_eq!(edited.username, "Ada");
    assert_eq!(edited.processed, ProcessedStatus::Unprocessed);
    assert!(edited.errors.is_empty());

    env.cmd(&["edit", &id_arg]).assert().failure();
    env.cmd(&["edit", &id_arg, "--status", "error"])
        .assert()
        .failure()
        .stderr(contains("reconciliation"));
    env.cmd(&["edit", "999", "--name", "Bob"])
        .assert()
        .failure()
        .stderr(contains("no record with id 999"));
}

#[test]
fn test_records_listing_with_errors() {
    let env = Env::new();
    init(&env);

    let store = env.store();
    let mut batch = vec![
        record(1, "2025-01-06 08:00:00", PunchType::In),
        record(1, "2025-01-06 17:00:00", PunchType::Out),
    ];
    store.save_records(&mut batch).unwrap();
    store
        .mark_record_error(batch[1].id.unwrap(), &[RecordError::new("time", "E360", "")])
        .unwrap();

    env.cmd(&["records"])
        .assert()
        .success()
        .stdout(contains("2000000"))
        .stdout(contains("2025-01-06 17:00:00"))
        .stdout(contains("ERROR"));

    env.cmd(&["records", "--status", "error", "--errors"])
        .assert()
        .success()
        .stdout(contains("E360"))
        .stdout(contains("No matching entrance for this exit"))
        .stdout(contains("2025-01-06 08:00:00").not());

    env.cmd(&["records", "--status", "maybe"]).assert().failure();
}

#[test]
fn test_retry_and_delete() {
    let env = Env::new();
    init(&env);

    let store = env.store();
    let mut batch = vec![
        record(1, "2025-01-06 08:00:00", PunchType::In),
        record(2, "2025-01-06 08:05:00", PunchType::In),
    ];
    store.save_records(&mut batch).unwrap();
    let first = batch[0].id.unwrap().to_string();
    let second = batch[1].id.unwrap().to_string();
    store
        .mark_record_error(batch[0].id.unwrap(), &[RecordError::new("code", "E0", "")])
        .unwrap();

    env.cmd(&["retry", &first])
        .assert()
        .success()
        .stdout(contains("1 record(s) set to UNPROCESSED"));
    env.cmd(&["records", "--status", "error"])
        .assert()
        .success()
        .stdout(contains("No records found"));

    env.cmd(&["retry", &second, "--status", "error"])
        .assert()
        .failure()
        .stderr(contains("reconciliation"));
    assert_eq!(
        store.get_record(batch[1].id.unwrap()).unwrap().unwrap().processed,
        ProcessedStatus::Unprocessed
    );

    env.cmd(&["del", &first, &second, "999"])
        .assert()
        .success()
        .stdout(contains("2 record(s) deleted"));
    env.cmd(&["del", "999"])
        .assert()
        .success()
        .stdout(contains("No matching records"));
}

#[test]
fn test_export_and_logs() {
    let env = Env::new();
    init(&env);

    env.cmd(&["export"])
        .assert()
        .success()
        .stdout(contains("No unprocessed records"));

    let store = env.store();
    let mut batch = vec![record(4, "2025-01-07 08:00:00", PunchType::In)];
    store.save_records(&mut batch).unwrap();

    env.cmd(&["export"])
        .assert()
        .success()
        .stdout(contains("1 record(s) written"));

    let files: Vec<_> = fs::read_dir(env.exports())
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(files.len(), 1);
    let content = fs::read_to_string(files[0].path()).unwrap();
    assert!(content.contains("EMP004,,2025-01-07 08:00:00,entree"));

    env.cmd(&["logs"])
        .assert()
        .success()
        .stdout(contains("No uploads logged yet"));

    store
        .log_api_upload(&ApiUploadLog::new("cafe0001", "a.csv", 1, UploadStatus::Success, None))
        .unwrap();
    env.cmd(&["logs", "--limit", "5"])
        .assert()
        .success()
        .stdout(contains("cafe0001"))
        .stdout(contains("SUCCESS"));
}
