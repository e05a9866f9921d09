use crate::cli::parser::Commands;
use crate::config::AppConfig;
use crate::db::{AttendanceRepository, SqliteStore};
use crate::errors::{AppError, AppResult};
use crate::models::ProcessedStatus;

pub fn handle(cmd: &Commands, cfg: &AppConfig) -> AppResult<()> {
    if let Commands::Retry { ids, status } = cmd {
        if *status == ProcessedStatus::Error {
            return Err(AppError::InvalidInput(
                "ERROR is set by reconciliation together with its error details".into(),
            ));
        }

        let store = SqliteStore::open(&cfg.database)?;
        let updated = store.mark_records_by_ids(ids, *status)?;

        if updated == 0 {
            println!("⚠️  No matching records");
        } else {
            println!("✅ {updated} record(s) set to {status}");
        }
    }

    Ok(())
}
