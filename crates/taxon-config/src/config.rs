//! Top-level configuration

use crate::components::{
    BuildConfig, EmbeddingConfig, EmbeddingProviderType, LoggingConfig, StorageConfig,
};
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Environment variables consulted by [`TaxonConfig::apply_env_overrides`].
pub mod env {
    pub const DB_PATH: &str = "TAXON_DB_PATH";
    pub const EMBEDDING_PROVIDER: &str = "TAXON_EMBEDDING_PROVIDER";
    pub const EMBEDDING_URL: &str = "TAXON_EMBEDDING_URL";
    pub const EMBEDDING_MODEL: &str = "TAXON_EMBEDDING_MODEL";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const LOG_LEVEL: &str = "TAXON_LOG_LEVEL";
}

/// Complete Taxon configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonConfig {
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub build: BuildConfig,
    pub logging: LoggingConfig,
}

impl TaxonConfig {
    /// Parse from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = lookup(env::DB_PATH) {
            debug!(var = env::DB_PATH, "Overriding database path from environment");
            self.storage.database_path = PathBuf::from(path);
        }
        if let Some(provider) = lookup(env::EMBEDDING_PROVIDER) {
            self.embedding.provider = provider.parse::<EmbeddingProviderType>()?;
        }
        if let Some(url) = lookup(env::EMBEDDING_URL) {
            self.embedding.api_url = Some(url);
        }
        if let Some(model) = lookup(env::EMBEDDING_MODEL) {
            self.embedding.model = Some(model);
        }
        if self.embedding.api_key.is_none() {
            self.embedding.api_key = lookup(env::OPENAI_API_KEY);
        }
        if let Some(level) = lookup(env::LOG_LEVEL) {
            self.logging.level = Some(level);
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.embedding.validate()?;
        if self.build.root_class.trim().is_empty() {
            return Err(ConfigError::Validation(
                "build.root_class must not be empty".to_string(),
            ));
        }
        if self.build.max_name_len == 0 {
            return Err(ConfigError::Validation(
                "build.max_name_len must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a construction pass should request embeddings.
    pub fn embeddings_active(&self) -> bool {
        self.build.embeddings_enabled && self.embedding.is_enabled()
    }

    /// A commented starter config file.
    pub fn example_toml() -> &'static str {
        r#"# Taxon Configuration
# Location: ~/.config/taxon/config.toml

[storage]
# Database used when no --session is given
database_path = "./taxonomy.db"

# Per-session databases are written here as ontology_{session}.db
output_dir = "./ontologies"

wal_mode = true
busy_timeout_ms = 5000

[embedding]
# ollama, openai, mock or none
provider = "ollama"

# Default: nomic-embed-text (ollama), text-embedding-3-small (openai)
model = "nomic-embed-text"

# Default: http://localhost:11434 (ollama), https://api.openai.com/v1 (openai)
api_url = "http://localhost:11434"

# Can also be set via OPENAI_API_KEY
# api_key = "sk-..."

timeout_seconds = 30

[build]
# Root class every top-level concept hangs from
root_class = "Thing"

# parent_index value meaning "no parent"
root_parent_sentinel = -1

iri_base = "http://www.semanticweb.org/MINDMAP_CLUSTER"
max_name_len = 200
embeddings_enabled = true

[logging]
# off, error, warn, info, debug, trace (unset: RUST_LOG)
# level = "info"
"#
    }
}
