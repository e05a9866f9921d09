use log::{info, warn};
use rusqlite::{Connection, Result};

/// Create the single-row `config` table.
fn create_config_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS config (
            id                  INTEGER PRIMARY KEY,
            company_id          TEXT NOT NULL DEFAULT '',
            api_username        TEXT NOT NULL DEFAULT '',
            api_password        TEXT NOT NULL DEFAULT '',
            api_secret_key      TEXT NOT NULL DEFAULT '',
            device_ip           TEXT NOT NULL DEFAULT '',
            device_port         INTEGER NOT NULL DEFAULT 4370,
            collection_interval INTEGER NOT NULL DEFAULT 60,
            upload_interval     INTEGER NOT NULL DEFAULT 1,
            import_interval     INTEGER NOT NULL DEFAULT 12,
            created_at          TEXT DEFAULT CURRENT_TIMESTAMP,
            updated_at          TEXT DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )?;
    Ok(())
}

/// Create the `attendance_records` table.
fn create_attendance_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS attendance_records (
            id          INTEGER PRIMARY KEY,
            uid         INTEGER NOT NULL UNIQUE DEFAULT 2000000,
            user_id     INTEGER NOT NULL,
            username    TEXT,
            timestamp   TEXT NOT NULL UNIQUE,
            status      INTEGER NOT NULL,
            punch_type  INTEGER NOT NULL,
            processed   TEXT NOT NULL DEFAULT 'UNPROCESSED'
                CHECK (processed IN ('PROCESSED', 'ERROR', 'UNPROCESSED')),
            errors      TEXT,
            created_at  TEXT DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )?;
    Ok(())
}

/// Create the `api_upload_logs` audit table.
fn create_upload_logs_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS api_upload_logs (
            id             INTEGER PRIMARY KEY,
            batch_id       TEXT NOT NULL,
            artifact_path  TEXT NOT NULL,
            records_count  INTEGER NOT NULL,
            status         TEXT NOT NULL CHECK (status IN ('SUCCESS', 'FAILED')),
            response_data  TEXT,
            created_at     TEXT DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )?;
    Ok(())
}

/// Check if `table` has a column named `column`.
fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{table}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Add a column to a table created by an older release.
fn ensure_column(conn: &Connection, table: &str, column: &str, ddl: &str) -> Result<()> {
    if has_column(conn, table, column)? {
        return Ok(());
    }

    warn!("Upgrading schema: adding '{column}' column to {table}");
    conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {ddl};"))?;
    Ok(())
}

/// Public entry point: create missing tables and upgrade old ones.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    // 1) WAL lets the scheduler thread write while the CLI reads
    let mode: String = conn.query_row("PRAGMA journal_mode=WAL;", [], |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case("wal") {
        warn!("SQLite journal mode is '{mode}', concurrent access may block");
    }

    // 2) Base tables
    create_config_table(conn)?;
    create_attendance_table(conn)?;
    create_upload_logs_table(conn)?;

    // 3) Columns added after the first releases
    ensure_column(conn, "attendance_records", "errors", "TEXT")?;
    ensure_column(conn, "config", "api_secret_key", "TEXT NOT NULL DEFAULT ''")?;
    ensure_column(conn, "config", "import_interval", "INTEGER NOT NULL DEFAULT 12")?;

    // 4) Export selection index
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_attendance_processed_ts
             ON attendance_records(processed, timestamp);",
    )?;

    info!("Database schema checked");
    Ok(())
}
