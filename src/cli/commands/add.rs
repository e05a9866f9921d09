use crate::cli::parser::Commands;
use crate::config::AppConfig;
use crate::db::{AttendanceRepository, SqliteStore};
use crate::errors::AppResult;
use crate::models::AttendanceRecord;
use crate::models::record::parse_timestamp;

pub fn handle(cmd: &Commands, cfg: &AppConfig) -> AppResult<()> {
    if let Commands::Add {
        user,
        name,
        time,
        punch_type,
        device_status,
    } = cmd
    {
        let timestamp = parse_timestamp(time)?;
        let store = SqliteStore::open(&cfg.database)?;

        let record =
            AttendanceRecord::new(*user, name.as_str(), timestamp, *device_status, *punch_type);
        let saved = store.save_record(record)?;

        match (saved.id, saved.uid) {
            (Some(id), Some(uid)) => {
                println!("✅ Record {id} added (uid {uid}) at {}", saved.timestamp_str())
            }
            _ => println!(
                "⚠️  A punch at {} is already stored, nothing added",
                saved.timestamp_str()
            ),
        }
    }

    Ok(())
}
