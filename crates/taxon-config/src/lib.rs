//! # Taxon Configuration Library
//!
//! Typed configuration for the taxonomy builder, loaded from TOML with
//! environment overrides.
//!
//! Precedence, lowest first: defaults, config file, environment, CLI flags
//! (applied by the binary).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use taxon_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = ConfigLoader::load_or_default(None).await?;
//!     config.apply_env_overrides()?;
//!     config.validate()?;
//!     println!("root class: {}", config.build.root_class);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod components;
mod config;
mod error;
mod loader;

pub use components::{
    BuildConfig, EmbeddingConfig, EmbeddingProviderType, LoggingConfig, StorageConfig,
};
pub use config::{env, TaxonConfig};
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
