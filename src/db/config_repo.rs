use crate::db::records::parse_db_datetime;
use crate::db::repositories::ConfigRepository;
use crate::db::store::SqliteStore;
use crate::errors::AppResult;
use crate::models::SyncConfig;
use log::info;
use rusqlite::{OptionalExtension, Row, params};

fn map_row(row: &Row) -> rusqlite::Result<SyncConfig> {
    let created_at: Option<String> = row.get("created_at")?;
    let updated_at: Option<String> = row.get("updated_at")?;

    Ok(SyncConfig {
        id: row.get("id")?,
        company_id: row.get("company_id")?,
        api_username: row.get("api_username")?,
        api_password: row.get("api_password")?,
        api_secret_key: row.get("api_secret_key")?,
        device_ip: row.get("device_ip")?,
        device_port: row.get("device_port")?,
        collection_interval: row.get("collection_interval")?,
        upload_interval: row.get("upload_interval")?,
        import_interval: row.get("import_interval")?,
        created_at: created_at.as_deref().and_then(parse_db_datetime),
        updated_at: updated_at.as_deref().and_then(parse_db_datetime),
    })
}

impl ConfigRepository for SqliteStore {
    fn get_config(&self) -> AppResult<Option<SyncConfig>> {
        let pool = self.pool()?;
        let cfg = pool
            .conn
            .query_row("SELECT * FROM config ORDER BY id LIMIT 1", [], map_row)
            .optional()?;
        Ok(cfg)
    }

    fn save_config(&self, config: &SyncConfig) -> AppResult<()> {
        let pool = self.pool()?;

        let existing: Option<i64> = pool
            .conn
            .query_row("SELECT id FROM config ORDER BY id LIMIT 1", [], |row| row.get(0))
            .optional()?;

        match existing {
            Some(id) => {
                pool.conn.execute(
                    "UPDATE config SET
                         company_id = ?1, api_username = ?2, api_password = ?3,
                         api_secret_key = ?4, device_ip = ?5, device_port = ?6,
                         collection_interval = ?7, upload_interval = ?8,
                         import_interval = ?9, updated_at = CURRENT_TIMESTAMP
                     WHERE id = ?10",
                    params![
                        config.company_id,
                        config.api_username,
                        config.api_password,
                        config.api_secret_key,
                        config.device_ip,
                        config.device_port,
                        config.collection_interval,
                        config.upload_interval,
                        config.import_interval,
                        id,
                    ],
                )?;
            }
            None => {
                pool.conn.execute(
                    "INSERT INTO config (
                         company_id, api_username, api_password, api_secret_key,
                         device_ip, device_port, collection_interval,
                         upload_interval, import_interval
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        config.company_id,
                        config.api_username,
                        config.api_password,
                        config.api_secret_key,
                        config.device_ip,
                        config.device_port,
                        config.collection_interval,
                        config.upload_interval,
                        config.import_interval,
                    ],
                )?;
            }
        }

        info!("Config saved successfully");
        Ok(())
    }
}
