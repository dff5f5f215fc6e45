//! Where a taxonomy database lives and how it is opened

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Private to one process; gone when the pool is dropped
    Memory,
}

/// Settings for [`crate::SqlitePool::open`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    pub location: DbLocation,
    /// Write-ahead logging; ignored for in-memory databases
    pub wal_mode: bool,
    /// How long a locked database is retried before failing
    pub busy_timeout_ms: u64,
}

impl SqliteConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            location: DbLocation::File(path.as_ref().to_path_buf()),
            wal_mode: true,
            busy_timeout_ms: 5000,
        }
    }

    pub fn memory() -> Self {
        Self {
            location: DbLocation::Memory,
            wal_mode: false,
            busy_timeout_ms: 5000,
        }
    }

    pub fn with_wal_mode(mut self, enabled: bool) -> Self {
        self.wal_mode = enabled;
        self
    }

    pub fn with_busy_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.busy_timeout_ms = timeout_ms;
        self
    }

    /// Database file, if this is not an in-memory database.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            DbLocation::File(path) => Some(path),
            DbLocation::Memory => None,
        }
    }
}
