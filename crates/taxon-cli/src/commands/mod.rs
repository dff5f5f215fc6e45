pub mod build;
pub mod cleanup;
pub mod config;
pub mod export;
pub mod inspect;
pub mod stats;

use crate::config::CliConfig;
use anyhow::{bail, Context, Result};
use std::path::Path;
use taxon_sqlite::{SqlitePool, SqliteTaxonomyStore};

/// Open the taxonomy database at `path`, creating it if needed.
pub(crate) fn open_store(config: &CliConfig, path: &Path) -> Result<SqliteTaxonomyStore> {
    let pool = SqlitePool::open(&config.sqlite_config(path))
        .with_context(|| format!("Failed to open taxonomy database: {}", path.display()))?;
    Ok(SqliteTaxonomyStore::new(pool))
}

/// Open the configured database for reading; it must already exist.
pub(crate) fn open_existing_store(config: &CliConfig) -> Result<SqliteTaxonomyStore> {
    let path = config.database_path();
    if !path.exists() {
        bail!(
            "No taxonomy database at {} (run `taxon build` first or pass --db)",
            path.display()
        );
    }
    open_store(config, path)
}
