use crate::cli::parser::Commands;
use crate::config::AppConfig;
use crate::db::{SqliteStore, UploadLogRepository};
use crate::errors::AppResult;
use crate::models::record::TIMESTAMP_FORMAT;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &AppConfig) -> AppResult<()> {
    if let Commands::Logs { limit } = cmd {
        let store = SqliteStore::open(&cfg.database)?;
        let logs = store.get_api_logs(*limit)?;

        if logs.is_empty() {
            println!("⚠️  No uploads logged yet");
            return Ok(());
        }

        let mut table = Table::new(&["id", "when", "batch", "records", "status", "artifact"]);
        for log in &logs {
            table.add_row(vec![
                log.id.map(|v| v.to_string()).unwrap_or_default(),
                log.created_at
                    .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
                    .unwrap_or_default(),
                log.batch_id.clone(),
                log.records_count.to_string(),
                log.status.to_db_str().to_string(),
                log.artifact_path.clone(),
            ]);
        }
        print!("{}", table.render());
    }

    Ok(())
}
