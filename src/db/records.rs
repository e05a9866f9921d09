use crate::db::repositories::{AttendanceRepository, RecordOrder};
use crate::db::store::SqliteStore;
use crate::errors::{AppError, AppResult};
use crate::models::record::{TIMESTAMP_FORMAT, UID_START, parse_timestamp};
use crate::models::{AttendanceRecord, ProcessedStatus, PunchType, RecordError};
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use rusqlite::types::{Type, Value};
use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use std::collections::BTreeSet;

/// Upper bound of bound parameters per statement.
const CHUNK: usize = 500;

const SELECT_RECORDS: &str = "SELECT id, uid, user_id, username, timestamp, status, punch_type,
                                     processed, errors, created_at
                              FROM attendance_records";

fn conversion_error(col: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, Type::Text, Box::new(err))
}

pub(crate) fn parse_db_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok()
}

pub fn map_row(row: &Row) -> rusqlite::Result<AttendanceRecord> {
    let ts_str: String = row.get("timestamp")?;
    let timestamp = NaiveDateTime::parse_from_str(&ts_str, TIMESTAMP_FORMAT)
        .map_err(|_| conversion_error(4, AppError::InvalidTimestamp(ts_str.clone())))?;

    let punch_code: i64 = row.get("punch_type")?;
    let punch_type = PunchType::from_db_code(punch_code).ok_or_else(|| {
        conversion_error(
            6,
            AppError::Other(format!("Invalid punch type: {punch_code}")),
        )
    })?;

    let processed_str: String = row.get("processed")?;
    let processed = ProcessedStatus::from_db_str(&processed_str)
        .ok_or_else(|| conversion_error(7, AppError::InvalidStatus(processed_str.clone())))?;

    let errors_json: Option<String> = row.get("errors")?;
    let errors = match errors_json.as_deref() {
        None | Some("") => Vec::new(),
        Some(json) => serde_json::from_str::<Vec<RecordError>>(json)
            .map_err(|e| conversion_error(8, AppError::Json(e)))?,
    };

    let created_at: Option<String> = row.get("created_at")?;

    Ok(AttendanceRecord {
        id: row.get("id")?,
        uid: row.get("uid")?,
        user_id: row.get("user_id")?,
        username: row.get::<_, Option<String>>("username")?.unwrap_or_default(),
        timestamp,
        status: row.get("status")?,
        punch_type,
        processed,
        errors,
        created_at: created_at.as_deref().and_then(parse_db_datetime),
    })
}

fn errors_to_json(errors: &[RecordError]) -> AppResult<Option<String>> {
    if errors.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(errors)?))
    }
}

/// First uid of the next insert batch.
fn first_uid_after(max_uid: Option<i64>) -> i64 {
    match max_uid {
        Some(max) if max >= UID_START => max + 1,
        _ => UID_START,
    }
}

fn placeholders(n: usize, offset: usize) -> String {
    (1..=n)
        .map(|i| format!("?{}", i + offset))
        .collect::<Vec<_>>()
        .join(", ")
}

impl AttendanceRepository for SqliteStore {
    fn get_records(
        &self,
        processed: Option<ProcessedStatus>,
        order: RecordOrder,
    ) -> AppResult<Vec<AttendanceRecord>> {
        let pool = self.pool()?;

        let mut sql = SELECT_RECORDS.to_string();
        let mut args: Vec<String> = Vec::new();

        if let Some(status) = processed {
            sql.push_str(" WHERE processed = ?1");
            args.push(status.to_db_str().to_string());
        }
        sql.push_str(&format!(" ORDER BY {} ASC, id ASC", order.column()));

        let mut stmt = pool.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), map_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    fn get_record(&self, id: i64) -> AppResult<Option<AttendanceRecord>> {
        let pool = self.pool()?;
        let sql = format!("{SELECT_RECORDS} WHERE id = ?1");
        let record = pool.conn.query_row(&sql, [id], map_row).optional()?;
        Ok(record)
    }

    fn save_record(&self, record: AttendanceRecord) -> AppResult<AttendanceRecord> {
        let mut batch = [record];
        self.save_records(&mut batch)?;
        let [saved] = batch;
        Ok(saved)
    }

    fn save_records(&self, records: &mut [AttendanceRecord]) -> AppResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut pool = self.pool()?;
        let tx = pool.conn.transaction()?;

        let max_uid: Option<i64> =
            tx.query_row("SELECT MAX(uid) FROM attendance_records", [], |row| row.get(0))?;
        let mut next_uid = first_uid_after(max_uid);
        let mut inserted = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO attendance_records
                     (uid, user_id, username, timestamp, status, punch_type, processed, errors)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for record in records.iter_mut() {
                let uid = record.uid.unwrap_or(next_uid);

                let changed = stmt.execute(params![
                    uid,
                    record.user_id,
                    record.username,
                    record.timestamp_str(),
                    record.status,
                    record.punch_type.to_db_code(),
                    record.processed.to_db_str(),
                    errors_to_json(&record.errors)?,
                ])?;

                if changed == 0 {
                    // replayed timestamp: the uid is not consumed
                    debug!("Skipping already stored punch at {}", record.timestamp_str());
                    continue;
                }

                record.uid = Some(uid);
                record.id = Some(tx.last_insert_rowid());
                inserted += 1;
                if uid >= next_uid {
                    next_uid = uid + 1;
                }
            }
        }

        tx.commit()?;
        info!(
            "Saved {inserted} of {} attendance records to database",
            records.len()
        );
        Ok(inserted)
    }

    fn update_record(&self, record: &AttendanceRecord) -> AppResult<()> {
        let id = record
            .id
            .ok_or_else(|| AppError::Other("Record ID is required for update".into()))?;

        // PROCESSED never carries errors
        let errors = if record.processed == ProcessedStatus::Processed {
            None
        } else {
            errors_to_json(&record.errors)?
        };

        let pool = self.pool()?;
        pool.conn.execute(
            "UPDATE attendance_records
             SET username = ?1, timestamp = ?2, status = ?3,
                 punch_type = ?4, processed = ?5, errors = ?6
             WHERE id = ?7",
            params![
                record.username,
                record.timestamp_str(),
                record.status,
                record.punch_type.to_db_code(),
                record.processed.to_db_str(),
                errors,
                id,
            ],
        )?;

        info!("Updated attendance record with id {id}");
        Ok(())
    }

    fn delete_record(&self, id: i64) -> AppResult<()> {
        let pool = self.pool()?;
        pool.conn
            .execute("DELETE FROM attendance_records WHERE id = ?1", [id])?;
        info!("Deleted attendance record with id {id}");
        Ok(())
    }

    fn delete_records(&self, ids: &[i64]) -> AppResult<usize> {
        let pool = self.pool()?;
        let mut deleted = 0;

        for chunk in ids.chunks(CHUNK) {
            let sql = format!(
                "DELETE FROM attendance_records WHERE id IN ({})",
                placeholders(chunk.len(), 0)
            );
            deleted += pool.conn.execute(&sql, params_from_iter(chunk.iter()))?;
        }

        info!("Deleted {deleted} attendance records");
        Ok(deleted)
    }

    fn mark_records_by_timestamps(
        &self,
        timestamps: &[String],
        status: ProcessedStatus,
    ) -> AppResult<usize> {
        // normalize the remote ISO form to the stored one, dropping duplicates
        let mut normalized = BTreeSet::new();
        for raw in timestamps {
            match parse_timestamp(raw) {
                Ok(ts) => {
                    normalized.insert(ts.format(TIMESTAMP_FORMAT).to_string());
                }
                Err(e) => warn!("Skipping unmatchable timestamp: {e}"),
            }
        }
        if normalized.is_empty() {
            return Ok(0);
        }

        let normalized: Vec<String> = normalized.into_iter().collect();
        let pool = self.pool()?;
        let mut matched = 0;

        for chunk in normalized.chunks(CHUNK) {
            let sql = format!(
                "UPDATE attendance_records SET processed = ?1, errors = NULL
                 WHERE timestamp IN ({})",
                placeholders(chunk.len(), 1)
            );
            let args = std::iter::once(status.to_db_str().to_string()).chain(chunk.iter().cloned());
            matched += pool.conn.execute(&sql, params_from_iter(args))?;
        }

        info!("Marked {matched} records as {status} by timestamp");
        Ok(matched)
    }

    fn mark_records_by_ids(&self, ids: &[i64], status: ProcessedStatus) -> AppResult<usize> {
        let pool = self.pool()?;
        let mut matched = 0;

        for chunk in ids.chunks(CHUNK) {
            let sql = format!(
                "UPDATE attendance_records SET processed = ?1, errors = NULL
                 WHERE id IN ({})",
                placeholders(chunk.len(), 1)
            );
            let args = std::iter::once(Value::Text(status.to_db_str().to_string()))
                .chain(chunk.iter().map(|id| Value::Integer(*id)));
            matched += pool.conn.execute(&sql, params_from_iter(args))?;
        }

        info!("Marked {matched} records as {status} by id");
        Ok(matched)
    }

    fn mark_record_error(&self, id: i64, errors: &[RecordError]) -> AppResult<bool> {
        let pool = self.pool()?;
        let changed = pool.conn.execute(
            "UPDATE attendance_records SET processed = ?1, errors = ?2 WHERE id = ?3",
            params![
                ProcessedStatus::Error.to_db_str(),
                errors_to_json(errors)?,
                id
            ],
        )?;

        if changed == 0 {
            warn!("Cannot mark record {id} as ERROR: not found");
            return Ok(false);
        }
        info!("Marked record {id} as ERROR with {} errors", errors.len());
        Ok(true)
    }
}
