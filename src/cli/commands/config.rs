use crate::cli::parser::Commands;
use crate::config::AppConfig;
use crate::db::{ConfigRepository, SqliteStore};
use crate::errors::{AppError, AppResult};

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &AppConfig) -> AppResult<()> {
    if let Commands::Config { print_config, set } = cmd {
        let store = SqliteStore::open(&cfg.database)?;
        let mut row = store.get_config()?.unwrap_or_default();

        if !set.is_empty() {
            for assignment in set {
                let (key, value) = assignment.split_once('=').ok_or_else(|| {
                    AppError::Config(format!("expected KEY=VALUE, got '{assignment}'"))
                })?;
                row.set_field(key, value)?;
            }
            row.validate()?;
            store.save_config(&row)?;
            println!("✅ Configuration updated ({} field(s))", set.len());
        }

        if *print_config || set.is_empty() {
            println!("📄 Current configuration:\n");
            print!("{}", serde_yaml::to_string(&row.masked())?);
        }
    }

    Ok(())
}
