//! Per-call SQLite connection wrapper.
//!
//! Every store operation opens its own connection and drops it when done;
//! concurrent writers from different threads are serialized by SQLite
//! itself, waiting up to `BUSY_TIMEOUT` for the lock.

use crate::errors::AppResult;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    pub fn new(path: &Path) -> AppResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }
}
