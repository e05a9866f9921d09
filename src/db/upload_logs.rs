use crate::db::records::parse_db_datetime;
use crate::db::repositories::UploadLogRepository;
use crate::db::store::SqliteStore;
use crate::errors::{AppError, AppResult};
use crate::models::{ApiUploadLog, UploadStatus};
use log::info;
use rusqlite::types::Type;
use rusqlite::{Row, params};

fn map_row(row: &Row) -> rusqlite::Result<ApiUploadLog> {
    let status_str: String = row.get("status")?;
    let status = UploadStatus::from_db_str(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            Box::new(AppError::InvalidStatus(status_str.clone())),
        )
    })?;

    let response: Option<String> = row.get("response_data")?;
    let response_data = match response.as_deref() {
        None | Some("") => None,
        Some(json) => Some(serde_json::from_str(json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e))
        })?),
    };

    let records_count: i64 = row.get("records_count")?;
    let created_at: Option<String> = row.get("created_at")?;

    Ok(ApiUploadLog {
        id: row.get("id")?,
        batch_id: row.get("batch_id")?,
        artifact_path: row.get("artifact_path")?,
        records_count: records_count.max(0) as usize,
        status,
        response_data,
        created_at: created_at.as_deref().and_then(parse_db_datetime),
    })
}

impl UploadLogRepository for SqliteStore {
    fn log_api_upload(&self, log: &ApiUploadLog) -> AppResult<i64> {
        let response_json = match &log.response_data {
            Some(v) => Some(serde_json::to_string(v)?),
            None => None,
        };

        let pool = self.pool()?;
        pool.conn.execute(
            "INSERT INTO api_upload_logs (batch_id, artifact_path, records_count, status, response_data)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                log.batch_id,
                log.artifact_path,
                log.records_count as i64,
                log.status.to_db_str(),
                response_json,
            ],
        )?;

        info!("Logged API upload: {}, {}", log.batch_id, log.status.to_db_str());
        Ok(pool.conn.last_insert_rowid())
    }

    fn get_api_logs(&self, limit: usize) -> AppResult<Vec<ApiUploadLog>> {
        let pool = self.pool()?;
        let mut stmt = pool.conn.prepare(
            "SELECT id, batch_id, artifact_path, records_count, status, response_data, created_at
             FROM api_upload_logs
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map([limit as i64], map_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}
