//! Component configurations
//!
//! Each component owns its own section of the config file.

pub mod build;
pub mod embedding;
pub mod logging;
pub mod storage;

pub use build::BuildConfig;
pub use embedding::{EmbeddingConfig, EmbeddingProviderType};
pub use logging::LoggingConfig;
pub use storage::StorageConfig;
