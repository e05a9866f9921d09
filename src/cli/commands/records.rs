use crate::cli::parser::Commands;
use crate::config::AppConfig;
use crate::db::{AttendanceRepository, RecordOrder, SqliteStore};
use crate::errors::AppResult;
use crate::models::{PunchType, error_code};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &AppConfig) -> AppResult<()> {
    if let Commands::Records { status, errors } = cmd {
        let store = SqliteStore::open(&cfg.database)?;
        let records = store.get_records(*status, RecordOrder::Timestamp)?;

        if records.is_empty() {
            println!("⚠️  No records found");
            return Ok(());
        }

        let mut table = Table::new(&["id", "uid", "user", "name", "time", "type", "status"]);
        for r in &records {
            table.add_row(vec![
                r.id.map(|v| v.to_string()).unwrap_or_default(),
                r.uid.map(|v| v.to_string()).unwrap_or_default(),
                r.user_id.to_string(),
                r.username.clone(),
                r.timestamp_str(),
                punch_label(r.punch_type).to_string(),
                r.processed.to_string(),
            ]);
        }
        print!("{}", table.render());

        if *errors {
            let failed: Vec<_> = records.iter().filter(|r| r.has_errors()).collect();
            if failed.is_empty() {
                return Ok(());
            }

            println!();
            let mut details = Table::new(&["id", "field", "code", "message"]);
            for r in failed {
                for e in &r.errors {
                    let message = if e.message.is_empty() {
                        error_code::describe(&e.code).to_string()
                    } else {
                        e.message.clone()
                    };
                    details.add_row(vec![
                        r.id.map(|v| v.to_string()).unwrap_or_default(),
                        e.field.clone(),
                        e.code.clone(),
                        message,
                    ]);
                }
            }
            print!("{}", details.render());
        }
    }

    Ok(())
}

fn punch_label(p: PunchType) -> &'static str {
    match p {
        PunchType::In => "IN",
        PunchType::Out => "OUT",
    }
}
