use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use std::fs;
use std::path::{Path, PathBuf};

/// SQLite-backed record store.
///
/// Holds only the database path; connections are opened per operation so
/// the store can be shared across threads freely.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Build the store and make sure the schema is current.
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let store = Self::new(path);
        store.init()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn init(&self) -> AppResult<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let pool = self.pool()?;
        init_db(&pool.conn)
    }

    pub(crate) fn pool(&self) -> AppResult<DbPool> {
        DbPool::new(&self.path)
    }
}
