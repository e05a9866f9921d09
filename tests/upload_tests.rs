mod common;
use common::{FakePayrollApi, fast_poll, files_in, orchestrator, record, temp_store};
use punchsync::db::{AttendanceRepository, RecordOrder, UploadLogRepository};
use punchsync::engine::PollSettings;
use punchsync::errors::ErrorKind;
use punchsync::models::{ImportLine, ProcessedStatus, PunchType, RecordError, UploadResponse, UploadStatus};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

fn seed_three(store: &punchsync::db::SqliteStore) -> Vec<i64> {
    let mut batch = vec![
        record(1, "2025-01-06 08:00:00", PunchType::In),
        record(2, "2025-01-06 08:10:00", PunchType::In),
        record(1, "2025-01-06 17:00:00", PunchType::Out),
    ];
    store.save_records(&mut batch).unwrap();
    batch.iter().map(|r| r.id.unwrap()).collect()
}

fn status_of(store: &punchsync::db::SqliteStore) -> Vec<ProcessedStatus> {
    store
        .get_records(None, RecordOrder::Timestamp)
        .unwrap()
        .iter()
        .map(|r| r.processed)
        .collect()
}

#[test]
fn test_nothing_to_upload() {
    let (dir, store) = temp_store();
    let export_dir = dir.path().join("exports");
    let api = Arc::new(FakePayrollApi::accepting("1", &["COMPLETED"]));

    let outcome = orchestrator(&store, api.clone(), &export_dir, fast_poll())
        .upload_attendance_to_api()
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.processed, 0);
    assert!(files_in(&export_dir).is_empty());
    assert!(store.get_api_logs(10).unwrap().is_empty());
    assert!(api.uploaded.lock().unwrap().is_empty());
}

#[test]
fn test_all_records_accepted() {
    let (dir, store) = temp_store();
    seed_three(&store);
    let api = Arc::new(FakePayrollApi::accepting("77", &["STARTING", "STARTED", "COMPLETED"]));
    api.accept_timestamps(&[
        "2025-01-06T08:00:00",
        "2025-01-06T08:10:00",
        "2025-01-06T17:00:00",
    ]);

    let outcome = orchestrator(&store, api.clone(), &dir.path().join("exports"), fast_poll())
        .upload_attendance_to_api()
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.processed, 3);
    assert_eq!(outcome.job_execution_id.as_deref(), Some("77"));
    assert_eq!(status_of(&store), vec![ProcessedStatus::Processed; 3]);
    assert_eq!(api.line_fetches.load(Ordering::SeqCst), 0);
    assert_eq!(api.job_queries.lock().unwrap().as_slice(), ["77"]);

    let logs = store.get_api_logs(10).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, UploadStatus::Success);
    assert_eq!(logs[0].records_count, 3);
    assert_eq!(logs[0].response_data.as_ref().unwrap()["processed"], 3);
}

#[test]
fn test_partial_acceptance_marks_named_failure_as_error() {
    let (dir, store) = temp_store();
    let ids = seed_three(&store);
    let api = Arc::new(FakePayrollApi::accepting("78", &["COMPLETED"]));
    api.accept_timestamps(&["2025-01-06T08:00:00", "2025-01-06T08:10:00"]);
    *api.lines.lock().unwrap() = vec![ImportLine {
        record_id: Some(ids[2]),
        errors: vec![RecordError::new("time", "E360", "No matching entrance")],
    }];

    let outcome = orchestrator(&store, api.clone(), &dir.path().join("exports"), fast_poll())
        .upload_attendance_to_api()
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.processed, 2);
    assert_eq!(api.line_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(
        status_of(&store),
        vec![
            ProcessedStatus::Processed,
            ProcessedStatus::Processed,
            ProcessedStatus::Error
        ]
    );

    let failed = store
        .get_records(Some(ProcessedStatus::Error), RecordOrder::Id)
        .unwrap();
    assert_eq!(failed[0].errors[0].code, "E360");
}

#[test]
fn test_partial_acceptance_unnamed_failure_stays_unprocessed() {
    let (dir, store) = temp_store();
    seed_three(&store);
    let api = Arc::new(FakePayrollApi::accepting("79", &["COMPLETED"]));
    api.accept_timestamps(&["2025-01-06T08:00:00", "2025-01-06T08:10:00"]);

    orchestrator(&store, api.clone(), &dir.path().join("exports"), fast_poll())
        .upload_attendance_to_api()
        .unwrap();

    assert_eq!(api.line_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(
        status_of(&store),
        vec![
            ProcessedStatus::Processed,
            ProcessedStatus::Processed,
            ProcessedStatus::Unprocessed
        ]
    );
}

#[test]
fn test_remote_failure_logs_and_reconciles() {
    let (dir, store) = temp_store();
    seed_three(&store);
    let api = Arc::new(FakePayrollApi::accepting("80", &["STARTED", "FAILED"]));

    let outcome = orchestrator(&store, api.clone(), &dir.path().join("exports"), fast_poll())
        .upload_attendance_to_api()
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.processed, 0);
    assert_eq!(outcome.kind, Some(ErrorKind::Validation));
    assert!(!status_of(&store).contains(&ProcessedStatus::Processed));
    assert_eq!(api.line_fetches.load(Ordering::SeqCst), 1);

    let logs = store.get_api_logs(10).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, UploadStatus::Failed);
}

#[test]
fn test_rejected_submission_leaves_records_untouched() {
    let (dir, store) = temp_store();
    seed_three(&store);
    let api = Arc::new(FakePayrollApi::default());
    *api.upload.lock().unwrap() = Some(Ok(UploadResponse::rejected("bad file")));

    let outcome = orchestrator(&store, api.clone(), &dir.path().join("exports"), fast_poll())
        .upload_attendance_to_api()
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.message, "bad file");
    assert_eq!(api.polls.load(Ordering::SeqCst), 0);
    assert_eq!(status_of(&store), vec![ProcessedStatus::Unprocessed; 3]);
    assert_eq!(store.get_api_logs(10).unwrap()[0].status, UploadStatus::Failed);
}

#[test]
fn test_network_error_on_submit_is_retryable() {
    let (dir, store) = temp_store();
    seed_three(&store);
    let api = Arc::new(FakePayrollApi::default());
    *api.upload.lock().unwrap() = Some(Err("connection reset".into()));

    let outcome = orchestrator(&store, api, &dir.path().join("exports"), fast_poll())
        .upload_attendance_to_api()
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.kind, Some(ErrorKind::Network));
    assert!(outcome.is_retryable());
    assert_eq!(store.get_api_logs(10).unwrap().len(), 1);
}

#[test]
fn test_poll_gives_up_within_timeout() {
    let (dir, store) = temp_store();
    seed_three(&store);
    let api = Arc::new(FakePayrollApi::accepting("81", &["STARTED"]));
    let poll = PollSettings {
        interval: Duration::from_millis(20),
        timeout: Duration::from_millis(200),
    };

    let started = Instant::now();
    let outcome = orchestrator(&store, api.clone(), &dir.path().join("exports"), poll)
        .upload_attendance_to_api()
        .unwrap();
    let elapsed = started.elapsed();

    assert!(!outcome.success);
    assert_eq!(outcome.kind, Some(ErrorKind::Timeout));
    assert!(elapsed < Duration::from_secs(2), "poll took {elapsed:?}");
    assert!(api.polls.load(Ordering::SeqCst) >= 2);
    assert_eq!(status_of(&store), vec![ProcessedStatus::Unprocessed; 3]);
    assert!(store.get_api_logs(10).unwrap().is_empty());
}

#[test]
fn test_unknown_status_keeps_polling() {
    let (dir, store) = temp_store();
    seed_three(&store);
    let api = Arc::new(FakePayrollApi::accepting("82", &["QUEUED", "COMPLETED"]));
    api.accept_timestamps(&[
        "2025-01-06T08:00:00",
        "2025-01-06T08:10:00",
        "2025-01-06T17:00:00",
    ]);

    let outcome = orchestrator(&store, api, &dir.path().join("exports"), fast_poll())
        .upload_attendance_to_api()
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.processed, 3);
}

#[test]
fn test_poll_error_is_caught() {
    let (dir, store) = temp_store();
    seed_three(&store);
    let api = Arc::new(FakePayrollApi::accepting("83", &["STARTED"]));
    api.poll_error.store(true, Ordering::SeqCst);

    let outcome = orchestrator(&store, api, &dir.path().join("exports"), fast_poll())
        .upload_attendance_to_api()
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.kind, Some(ErrorKind::Network));
    assert_eq!(outcome.job_execution_id.as_deref(), Some("83"));
}

#[test]
fn test_round_trip_processes_once() {
    let (dir, store) = temp_store();
    let mut batch = vec![record(5, "2025-03-03 07:59:00", PunchType::In)];
    store.save_records(&mut batch).unwrap();

    let api = Arc::new(FakePayrollApi::accepting("90", &["COMPLETED"]));
    api.accept_timestamps(&["2025-03-03T07:59:00"]);
    let upload = orchestrator(&store, api.clone(), &dir.path().join("exports"), fast_poll());

    assert_eq!(upload.upload_attendance_to_api().unwrap().processed, 1);
    assert_eq!(status_of(&store), vec![ProcessedStatus::Processed]);

    // nothing left to ship on the next cycle
    let second = upload.upload_attendance_to_api().unwrap();
    assert_eq!(second.processed, 0);
    assert_eq!(api.uploaded.lock().unwrap().len(), 1);
    assert_eq!(store.get_api_logs(10).unwrap().len(), 1);
}

#[test]
fn test_artifact_contains_importer_columns() {
    let (dir, store) = temp_store();
    let ids = seed_three(&store);
    let export_dir = dir.path().join("exports");
    let api = Arc::new(FakePayrollApi::accepting("91", &["COMPLETED"]));

    orchestrator(&store, api.clone(), &export_dir, fast_poll())
        .upload_attendance_to_api()
        .unwrap();

    let uploaded = api.uploaded.lock().unwrap()[0].clone();
    let name = uploaded.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("attendance_") && name.ends_with(".csv"), "{name}");

    let content = std::fs::read_to_string(&uploaded).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("code,Nom,time,type,recordId"));
    let first = lines.next().unwrap();
    assert!(first.starts_with("EMP001,,2025-01-06 08:00:00,entree,"), "{first}");
    assert!(first.ends_with(&ids[0].to_string()));
    assert!(content.contains("sortie"));
}
