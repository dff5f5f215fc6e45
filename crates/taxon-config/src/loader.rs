//! Configuration file loading

use crate::config::TaxonConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Loads [`TaxonConfig`] from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// `~/.config/taxon/config.toml` (platform equivalent).
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("taxon");
        Ok(config_dir.join("config.toml"))
    }

    /// Read and parse a config file.
    pub async fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<TaxonConfig> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config =
            TaxonConfig::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Load `path` (or the default location) if it exists, else defaults.
    ///
    /// An explicitly given path that does not exist is an error; a missing
    /// default file is not.
    pub async fn load_or_default(path: Option<&Path>) -> ConfigResult<TaxonConfig> {
        if let Some(path) = path {
            return Self::load_from_file(path).await;
        }

        match Self::default_config_path() {
            Ok(default) if tokio::fs::try_exists(&default).await.unwrap_or(false) => {
                Self::load_from_file(&default).await
            }
            _ => {
                debug!("No configuration file found, using defaults");
                Ok(TaxonConfig::default())
            }
        }
    }

    /// Write the commented example config to `path`, creating parents.
    pub async fn create_example(path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(path, TaxonConfig::example_toml())
            .await
            .map_err(io_err)?;

        info!(path = %path.display(), "Wrote example configuration");
        Ok(())
    }

    /// Serialize `config` to `path`.
    pub async fn save(config: &TaxonConfig, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let contents = config.to_toml_string()?;
        tokio::fs::write(path, contents)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}
