//! Storage component configuration
//!
//! Where taxonomies are persisted and how the SQLite connection is tuned.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage component configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Default database used when no session is given.
    pub database_path: PathBuf,
    /// Directory holding per-session `ontology_{id}.db` files.
    pub output_dir: PathBuf,
    pub wal_mode: bool,
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./taxonomy.db"),
            output_dir: PathBuf::from("./ontologies"),
            wal_mode: true,
            busy_timeout_ms: 5000,
        }
    }
}

impl StorageConfig {
    /// Database file for a processing session.
    pub fn session_db_path(&self, session_id: &str) -> PathBuf {
        self.output_dir.join(format!("ontology_{}.db", session_id))
    }
}
