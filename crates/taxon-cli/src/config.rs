//! Effective CLI configuration
//!
//! Precedence, lowest first: defaults, config file, environment, flags.
//! With `TAXON_TEST_MODE` set, the default config file is ignored so tests
//! never pick up the developer's own settings.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use taxon_config::{ConfigLoader, EmbeddingConfig, TaxonConfig};
use taxon_sqlite::SqliteConfig;
use tracing::debug;

pub const TEST_MODE_VAR: &str = "TAXON_TEST_MODE";

/// Values given on the command line that override configuration.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub embedding_url: Option<String>,
    pub embedding_model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub taxon: TaxonConfig,
    /// File the configuration was read from, if any
    pub source: Option<PathBuf>,
}

impl CliConfig {
    pub async fn load(overrides: CliOverrides) -> Result<Self> {
        let (mut taxon, source) = Self::from_file_or_default(overrides.config_file).await?;

        taxon
            .apply_env_overrides()
            .context("Invalid value in environment")?;

        if let Some(path) = overrides.db_path {
            taxon.storage.database_path = path;
        }
        if let Some(url) = overrides.embedding_url {
            taxon.embedding.api_url = Some(url);
        }
        if let Some(model) = overrides.embedding_model {
            taxon.embedding.model = Some(model);
        }

        Ok(Self { taxon, source })
    }

    async fn from_file_or_default(
        config_file: Option<PathBuf>,
    ) -> Result<(TaxonConfig, Option<PathBuf>)> {
        if let Some(path) = config_file {
            let config = ConfigLoader::load_from_file(&path)
                .await
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;
            return Ok((config, Some(path)));
        }

        if std::env::var_os(TEST_MODE_VAR).is_some() {
            debug!("Test mode, ignoring default config file");
            return Ok((TaxonConfig::default(), None));
        }

        let default = ConfigLoader::default_config_path()
            .ok()
            .filter(|p| p.exists());
        let config = ConfigLoader::load_or_default(default.as_deref())
            .await
            .context("Failed to load configuration")?;
        Ok((config, default))
    }

    pub fn database_path(&self) -> &Path {
        &self.taxon.storage.database_path
    }

    /// Database for a build: the session store if a session id is given.
    pub fn build_database_path(&self, session: Option<&str>) -> PathBuf {
        match session {
            Some(id) => self.taxon.storage.session_db_path(id),
            None => self.taxon.storage.database_path.clone(),
        }
    }

    pub fn sqlite_config(&self, path: impl AsRef<Path>) -> SqliteConfig {
        SqliteConfig::new(path)
            .with_wal_mode(self.taxon.storage.wal_mode)
            .with_busy_timeout_ms(self.taxon.storage.busy_timeout_ms)
    }

    pub fn embedding(&self) -> &EmbeddingConfig {
        &self.taxon.embedding
    }

    pub fn display_as_toml(&self) -> Result<String> {
        self.taxon
            .to_toml_string()
            .context("Failed to serialize config as TOML")
    }

    pub fn display_as_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.taxon).context("Failed to serialize config as JSON")
    }
}
