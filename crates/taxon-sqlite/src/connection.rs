//! Shared connection to a taxonomy database
//!
//! A construction pass has a single writer, so one connection behind a
//! mutex serves the whole store. Every call hops onto tokio's blocking pool.
//! Writes run inside an immediate transaction: a lookup followed by an
//! insert either commits as a unit or leaves the database untouched.

use crate::config::{DbLocation, SqliteConfig};
use crate::error::{SqliteError, SqliteResult};
use crate::schema;
use parking_lot::Mutex;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Cloneable handle to one SQLite connection
#[derive(Clone)]
pub struct SqlitePool {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePool {
    /// Open the database, creating the file, its directory and the schema
    /// as needed. Reopening an existing file keeps everything stored in it.
    pub fn open(config: &SqliteConfig) -> SqliteResult<Self> {
        let conn = match &config.location {
            DbLocation::Memory => Connection::open_in_memory()?,
            DbLocation::File(path) => {
                let existed = path.exists();
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir).map_err(|e| {
                        SqliteError::Connection(format!("Cannot create {}: {}", dir.display(), e))
                    })?;
                }
                let conn = Connection::open(path)?;
                info!(path = %path.display(), existed, "Opened taxonomy database");
                conn
            }
        };

        apply_pragmas(&conn, config)?;
        schema::apply_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> SqliteResult<Self> {
        Self::open(&SqliteConfig::memory())
    }

    /// Run a query against the connection.
    pub async fn read<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&Connection) -> SqliteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        off_runtime(move || f(&conn.lock())).await
    }

    /// Run `f` in an immediate transaction, committing only if it succeeds.
    pub async fn write<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> SqliteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        off_runtime(move || {
            let mut guard = conn.lock();
            let tx = guard.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let value = f(&tx)?;
            tx.commit()?;
            Ok(value)
        })
        .await
    }

    /// Page-level size figures.
    pub async fn stats(&self) -> SqliteResult<DbStats> {
        self.read(|conn| {
            let pragma = |name: &str| -> SqliteResult<u64> {
                let value: i64 = conn.pragma_query_value(None, name, |row| row.get(0))?;
                Ok(value.max(0) as u64)
            };
            let page_count = pragma("page_count")?;
            let page_size = pragma("page_size")?;
            Ok(DbStats {
                page_count,
                page_size,
                freelist_count: pragma("freelist_count")?,
                total_size_bytes: page_count * page_size,
            })
        })
        .await
    }
}

fn apply_pragmas(conn: &Connection, config: &SqliteConfig) -> SqliteResult<()> {
    // Parent links and annotations reference classes(id).
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;

    if config.wal_mode && config.location != DbLocation::Memory {
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        debug!(mode = %mode, "Journal mode set");
    }
    Ok(())
}

async fn off_runtime<F, T>(f: F) -> SqliteResult<T>
where
    F: FnOnce() -> SqliteResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SqliteError::Connection(format!("Database task failed: {}", e)))?
}

/// On-disk size of a database
#[derive(Debug, Clone, Serialize)]
pub struct DbStats {
    pub page_count: u64,
    pub page_size: u64,
    pub freelist_count: u64,
    pub total_size_bytes: u64,
}
