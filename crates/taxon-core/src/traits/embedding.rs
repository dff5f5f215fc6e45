//! Embedding provider abstraction
//!
//! Core only defines the contract; concrete providers (Ollama, OpenAI, mock)
//! live in `taxon-llm`. The builder receives a provider explicitly and never
//! looks one up from ambient state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for embedding operations
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Errors from an embedding service
#[derive(Debug, Clone, thiserror::Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Embedding request timed out after {0}ms")]
    Timeout(u64),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl EmbeddingError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout(_) | Self::Unavailable(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse(_) | Self::ConfigError(_) => false,
        }
    }
}

/// Response from embedding generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    pub embedding: Vec<f32>,
    pub model: String,
    pub dimensions: usize,
    pub tokens: Option<usize>,
}

impl EmbeddingResponse {
    pub fn new(embedding: Vec<f32>, model: impl Into<String>) -> Self {
        let dimensions = embedding.len();
        Self {
            embedding,
            model: model.into(),
            dimensions,
            tokens: None,
        }
    }
}

/// Text in, vector out.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> EmbeddingResult<EmbeddingResponse>;

    fn model_name(&self) -> &str;

    fn provider_name(&self) -> &str;

    /// Expected vector length for the configured model.
    fn dimensions(&self) -> usize;
}

/// Serialize an embedding into the stored annotation format (`[v1,v2,...]`).
pub fn serialize_embedding(embedding: &[f32]) -> String {
    // A slice of f32 always serializes; NaN/inf become `null`.
    serde_json::to_string(embedding).unwrap_or_else(|_| String::from("[]"))
}

/// Parse an embedding annotation written by [`serialize_embedding`].
pub fn parse_embedding(value: &str) -> Result<Vec<f32>, serde_json::Error> {
    serde_json::from_str(value)
}
