use crate::config::AppConfig;
use crate::db::{ConfigRepository, SqliteStore};
use crate::errors::AppResult;
use crate::scheduler::{ATTENDANCE_COLLECTION, ATTENDANCE_UPLOAD, IntervalUnit, USER_IMPORT, resolve_interval};
use crate::utils::table::Table;

pub fn handle(cfg: &AppConfig) -> AppResult<()> {
    let store = SqliteStore::open(&cfg.database)?;
    let row = store.get_config()?.unwrap_or_default();

    let mut table = Table::new(&["job", "every"]);
    for name in [ATTENDANCE_COLLECTION, ATTENDANCE_UPLOAD, USER_IMPORT] {
        let every = resolve_interval(name, &row)
            .map(|i| format!("{i} {}", IntervalUnit::Minutes))
            .unwrap_or_else(|| "-".into());
        table.add_row(vec![name.to_string(), every]);
    }
    print!("{}", table.render());
    println!("\nscheduler tick: {} ms", cfg.tick_millis);

    Ok(())
}
