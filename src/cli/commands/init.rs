use crate::config::AppConfig;
use crate::db::{ConfigRepository, SqliteStore};
use crate::errors::AppResult;
use crate::models::SyncConfig;
use std::path::Path;

/// Handle the `init` command
///
/// This initializes:
///  - the settings file (if missing)
///  - the SQLite database and its schema upgrades
///  - a default configuration row (if none exists)
pub fn handle(cfg: &AppConfig, config_path: &Path) -> AppResult<()> {
    println!("⚙️  Initializing punchsync…");

    if cfg.write_if_missing(config_path)? {
        println!("📄 Settings file created : {}", config_path.display());
    } else {
        println!("📄 Settings file         : {}", config_path.display());
    }

    let store = SqliteStore::open(&cfg.database)?;
    println!("🗄️  Database              : {}", store.path().display());

    if store.get_config()?.is_none() {
        store.save_config(&SyncConfig::default())?;
        println!("🧩 Default configuration row created (see `punchsync config --print`)");
    }

    println!("✅ punchsync initialization completed!");
    Ok(())
}
