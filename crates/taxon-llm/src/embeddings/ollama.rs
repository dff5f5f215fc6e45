//! Ollama embedding provider implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use taxon_config::EmbeddingConfig;
use taxon_core::{EmbeddingError, EmbeddingProvider, EmbeddingResponse, EmbeddingResult};

/// Request structure for the Ollama `/api/embed` endpoint
#[derive(Debug, Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response structure from the Ollama `/api/embed` endpoint
#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<usize>,
}

/// Ollama embedding provider
///
/// Connects to an Ollama server (local or remote). One request per text.
pub struct OllamaProvider {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: usize,
    timeout_secs: u64,
}

impl OllamaProvider {
    /// Create a new Ollama provider from configuration
    pub fn new(config: &EmbeddingConfig) -> EmbeddingResult<Self> {
        Ok(Self {
            client: super::build_client(config.timeout_seconds)?,
            endpoint: super::endpoint(config)?,
            model: config.get_model().to_string(),
            dimensions: config.get_dimensions(),
            timeout_secs: config.timeout_seconds,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    async fn embed(&self, text: &str) -> EmbeddingResult<EmbeddingResponse> {
        let url = format!("{}/api/embed", self.endpoint);
        tracing::debug!(url = %url, chars = text.len(), "Sending embedding request");

        let response = self
            .client
            .post(&url)
            .json(&OllamaEmbedRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| super::send_error(e, self.timeout_secs))?;

        if !response.status().is_success() {
            return Err(super::status_error("ollama", response).await);
        }

        let body: OllamaEmbedResponse = response.json().await.map_err(|e| {
            EmbeddingError::InvalidResponse(format!("Failed to parse Ollama response: {}", e))
        })?;

        let embedding = body.embeddings.into_iter().next().ok_or_else(|| {
            EmbeddingError::InvalidResponse("No embedding in Ollama response".to_string())
        })?;

        let mut result =
            EmbeddingResponse::new(embedding, body.model.unwrap_or_else(|| self.model.clone()));
        result.tokens = body.prompt_eval_count;
        Ok(result)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
