use crate::cli::parser::Commands;
use crate::config::AppConfig;
use crate::db::{AttendanceRepository, SqliteStore};
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &AppConfig) -> AppResult<()> {
    if let Commands::Del { ids } = cmd {
        let store = SqliteStore::open(&cfg.database)?;
        let deleted = store.delete_records(ids)?;

        if deleted == 0 {
            println!("⚠️  No matching records");
        } else {
            println!("✅ {deleted} record(s) deleted");
        }
    }

    Ok(())
}
