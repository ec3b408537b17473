pub mod migrations;
pub mod models;
pub mod queries;
pub mod seed;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Where the binary keeps its database unless told otherwise.
pub const DEFAULT_DB_PATH: &str = "./data/kassa.db";

/// Process-wide storage handle. One SQLite connection behind a mutex;
/// share it behind an `Arc` and drop it on shutdown to close the file.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database file at `path`, creating it (and its parent
    /// directories) if absent. A file that is not a SQLite database is
    /// rejected here rather than on first query.
    pub fn connect(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;

        // WAL mode for concurrent reads; also forces SQLite to read the header
        conn.pragma_update(None, "journal_mode", "WAL")
            .with_context(|| format!("{} is not a usable database", path.display()))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }

    /// Like [`Database::with_conn`], but hands out `&mut` so the closure can
    /// open a transaction.
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&mut conn)
    }

    /// Create missing tables and columns. Never drops or rewrites data.
    pub fn migrate(&self) -> Result<()> {
        self.with_conn(migrations::run)
    }

    /// Drop the products table with all of its rows.
    pub fn purge(&self) -> Result<()> {
        self.with_conn(migrations::drop_products)
    }

    /// Append the fixed catalog. Running it twice duplicates every row.
    pub fn seed(&self) -> Result<usize> {
        self.with_conn_mut(seed::insert_catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_creates_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("kassa.db");

        let db = Database::connect(&path).unwrap();
        assert!(path.exists());

        let mode: String = db
            .with_conn(|conn| {
                Ok(conn.query_row("PRAGMA journal_mode", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn connect_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kassa.db");
        std::fs::write(&path, "this is not a sqlite database ".repeat(64)).unwrap();

        assert!(Database::connect(&path).is_err());
    }

    #[test]
    fn reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kassa.db");

        {
            let db = Database::connect(&path).unwrap();
            db.migrate().unwrap();
            db.seed().unwrap();
        }

        let db = Database::connect(&path).unwrap();
        assert_eq!(db.count_products().unwrap(), 12);
    }
}
