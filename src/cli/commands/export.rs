use crate::cli::parser::Commands;
use crate::config::AppConfig;
use crate::db::SqliteStore;
use crate::engine::BatchExporter;
use crate::errors::AppResult;
use crate::utils::path::expand_tilde;
use std::sync::Arc;

/// Materialize the pending batch; records keep their status.
pub fn handle(cmd: &Commands, cfg: &AppConfig) -> AppResult<()> {
    if let Commands::Export { format } = cmd {
        let store = Arc::new(SqliteStore::open(&cfg.database)?);
        let exporter = BatchExporter::new(
            store,
            expand_tilde(&cfg.export_dir),
            format.unwrap_or(cfg.export_format),
        );

        match exporter.export_batch()? {
            Some(batch) => println!(
                "✅ Batch {} with {} record(s) written to {}",
                batch.batch_id,
                batch.records_count,
                batch.artifact_path.display()
            ),
            None => println!("⚠️  No unprocessed records to export"),
        }
    }

    Ok(())
}
