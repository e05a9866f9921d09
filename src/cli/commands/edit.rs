use crate::cli::parser::Commands;
use crate::config::AppConfig;
use crate::db::{AttendanceRepository, SqliteStore};
use crate::errors::{AppError, AppResult};
use crate::models::ProcessedStatus;
use crate::models::record::parse_timestamp;

pub fn handle(cmd: &Commands, cfg: &AppConfig) -> AppResult<()> {
    if let Commands::Edit {
        id,
        name,
        time,
        punch_type,
        status,
    } = cmd
    {
        if name.is_none() && time.is_none() && punch_type.is_none() && status.is_none() {
            return Err(AppError::InvalidInput(
                "nothing to change: pass --name, --time, --type or --status".into(),
            ));
        }

        let store = SqliteStore::open(&cfg.database)?;
        let mut record = store
            .get_record(*id)?
            .ok_or_else(|| AppError::InvalidInput(format!("no record with id {id}")))?;

        if let Some(name) = name {
            record.username = name.clone();
        }
        if let Some(time) = time {
            record.timestamp = parse_timestamp(time)?;
        }
        if let Some(punch_type) = punch_type {
            record.punch_type = *punch_type;
        }
        match status {
            Some(ProcessedStatus::Error) => {
                return Err(AppError::InvalidInput(
                    "ERROR is set by reconciliation together with its error details".into(),
                ));
            }
            Some(ProcessedStatus::Processed) => record.mark_as_processed(),
            Some(ProcessedStatus::Unprocessed) => record.mark_as_unprocessed(),
            None => {}
        }

        store.update_record(&record)?;
        println!("✅ Record {id} updated");
    }

    Ok(())
}
