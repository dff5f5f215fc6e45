//! Embedding configuration with sensible defaults

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Embedding provider type - enum for TOML serialization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderType {
    /// Ollama provider (local or remote)
    #[default]
    Ollama,
    /// OpenAI-compatible API provider
    OpenAI,
    /// Deterministic provider for tests and offline runs
    Mock,
    /// No embeddings; only summaries are stored
    None,
}

impl EmbeddingProviderType {
    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAI => "openai",
            Self::Mock => "mock",
            Self::None => "none",
        }
    }
}

impl fmt::Display for EmbeddingProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmbeddingProviderType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "mock" => Ok(Self::Mock),
            "none" | "off" | "disabled" => Ok(Self::None),
            other => Err(ConfigError::Validation(format!(
                "unknown embedding provider '{}' (expected ollama, openai, mock or none)",
                other
            ))),
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProviderType,
    /// Model name (defaults to the provider's usual embedding model)
    pub model: Option<String>,
    /// Custom API endpoint
    pub api_url: Option<String>,
    /// API key for OpenAI-compatible services
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Vector size; only used by the mock provider
    pub dimensions: Option<usize>,
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::Ollama,
            model: None,
            api_url: None,
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
            dimensions: None,
        }
    }
}

impl EmbeddingConfig {
    /// Mock provider config, handy in tests.
    pub fn mock(dimensions: usize) -> Self {
        Self {
            provider: EmbeddingProviderType::Mock,
            dimensions: Some(dimensions),
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider != EmbeddingProviderType::None
    }

    /// Get the actual model name to use
    pub fn get_model(&self) -> &str {
        self.model.as_deref().unwrap_or(match self.provider {
            EmbeddingProviderType::Ollama => "nomic-embed-text",
            EmbeddingProviderType::OpenAI => "text-embedding-3-small",
            EmbeddingProviderType::Mock => "mock-embed",
            EmbeddingProviderType::None => "",
        })
    }

    /// Get API URL for remote providers
    pub fn get_api_url(&self) -> Option<&str> {
        match self.provider {
            EmbeddingProviderType::Ollama => {
                self.api_url.as_deref().or(Some("http://localhost:11434"))
            }
            EmbeddingProviderType::OpenAI => self
                .api_url
                .as_deref()
                .or(Some("https://api.openai.com/v1")),
            EmbeddingProviderType::Mock | EmbeddingProviderType::None => None,
        }
    }

    pub fn get_dimensions(&self) -> usize {
        self.dimensions.unwrap_or(match self.provider {
            EmbeddingProviderType::OpenAI => 1536,
            _ => 768,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.is_enabled() {
            return Ok(());
        }
        if matches!(self.model.as_deref(), Some(m) if m.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "embedding model name must not be empty".to_string(),
            ));
        }
        if self.provider == EmbeddingProviderType::OpenAI
            && self.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(ConfigError::MissingValue(
                "embedding.api_key (or OPENAI_API_KEY) for the openai provider".to_string(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "embedding.timeout_seconds must be positive".to_string(),
            ));
        }
        if self.dimensions == Some(0) {
            return Err(ConfigError::Validation(
                "embedding.dimensions must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
