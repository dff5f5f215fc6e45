//! OpenAI embedding provider implementation
//!
//! Works against any OpenAI-compatible `/embeddings` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use taxon_config::EmbeddingConfig;
use taxon_core::{EmbeddingError, EmbeddingProvider, EmbeddingResponse, EmbeddingResult};

/// OpenAI API request for embeddings
#[derive(Debug, Serialize)]
struct OpenAIEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// OpenAI API response for embeddings
#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
    model: String,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
}

/// OpenAI error response
#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}

/// OpenAI embedding provider
pub struct OpenAIProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimensions: usize,
    timeout_secs: u64,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration
    pub fn new(config: &EmbeddingConfig) -> EmbeddingResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| EmbeddingError::ConfigError("OpenAI requires an API key".to_string()))?;

        Ok(Self {
            client: super::build_client(config.timeout_seconds)?,
            endpoint: super::endpoint(config)?,
            api_key,
            model: config.get_model().to_string(),
            dimensions: config.get_dimensions(),
            timeout_secs: config.timeout_seconds,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    async fn embed(&self, text: &str) -> EmbeddingResult<EmbeddingResponse> {
        let response = self
            .client
            .post(format!("{}/embeddings", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&OpenAIEmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| super::send_error(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            // Prefer the structured error message when the body carries one.
            return Err(match super::status_error("openai", response).await {
                EmbeddingError::Api { status, message } => EmbeddingError::Api {
                    status,
                    message: serde_json::from_str::<OpenAIErrorResponse>(&message)
                        .map(|e| e.error.message)
                        .unwrap_or(message),
                },
                other => other,
            });
        }

        let body: OpenAIEmbeddingResponse = response.json().await.map_err(|e| {
            EmbeddingError::InvalidResponse(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let data = body.data.into_iter().next().ok_or_else(|| {
            EmbeddingError::InvalidResponse("No embedding data in response".to_string())
        })?;

        let mut result = EmbeddingResponse::new(data.embedding, body.model);
        result.tokens = body.usage.map(|u| u.prompt_tokens);
        Ok(result)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxon_config::EmbeddingProviderType;

    #[test]
    fn test_requires_api_key() {
        let config = EmbeddingConfig {
            provider: EmbeddingProviderType::OpenAI,
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            OpenAIProvider::new(&config),
            Err(EmbeddingError::ConfigError(_))
        ));
    }

    #[test]
    fn test_error_body_parsing() {
        let json = r#"{"error":{"message":"Incorrect API key","type":"invalid_request_error"}}"#;
        let parsed: OpenAIErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.message, "Incorrect API key");
    }
}
