//! Embedding providers
//!
//! Concrete implementations of the core [`EmbeddingProvider`] trait. The
//! builder never picks a provider itself; the binary calls
//! [`create_provider`] with the loaded configuration and hands the result in.

/// Mock provider for tests and offline runs
pub mod mock;

/// Ollama provider implementation.
pub mod ollama;

/// OpenAI provider implementation.
pub mod openai;

pub use mock::MockEmbeddingProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;

use std::sync::Arc;
use std::time::Duration;
use taxon_config::{EmbeddingConfig, EmbeddingProviderType};
use taxon_core::{EmbeddingError, EmbeddingProvider, EmbeddingResult};

/// Create an embedding provider from configuration.
///
/// Returns `Ok(None)` when embeddings are disabled (`provider = "none"`).
pub fn create_provider(
    config: &EmbeddingConfig,
) -> EmbeddingResult<Option<Arc<dyn EmbeddingProvider>>> {
    config
        .validate()
        .map_err(|e| EmbeddingError::ConfigError(e.to_string()))?;

    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        EmbeddingProviderType::Ollama => Arc::new(OllamaProvider::new(config)?),
        EmbeddingProviderType::OpenAI => Arc::new(OpenAIProvider::new(config)?),
        EmbeddingProviderType::Mock => {
            Arc::new(MockEmbeddingProvider::with_dimensions(config.get_dimensions()))
        }
        EmbeddingProviderType::None => return Ok(None),
    };

    tracing::info!(
        provider = provider.provider_name(),
        model = provider.model_name(),
        "Embedding provider ready"
    );
    Ok(Some(provider))
}

fn build_client(timeout_secs: u64) -> EmbeddingResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| EmbeddingError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

fn endpoint(config: &EmbeddingConfig) -> EmbeddingResult<String> {
    config
        .get_api_url()
        .map(|url| url.trim_end_matches('/').to_string())
        .ok_or_else(|| {
            EmbeddingError::ConfigError(format!(
                "provider '{}' has no API endpoint",
                config.provider
            ))
        })
}

fn send_error(err: reqwest::Error, timeout_secs: u64) -> EmbeddingError {
    if err.is_timeout() {
        EmbeddingError::Timeout(timeout_secs * 1000)
    } else if err.is_connect() {
        EmbeddingError::Unavailable(err.to_string())
    } else {
        EmbeddingError::Http(err.to_string())
    }
}

/// Turn a non-success response into an [`EmbeddingError::Api`].
async fn status_error(provider: &str, response: reqwest::Response) -> EmbeddingError {
    let status = response.status();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    tracing::debug!(provider, status = status.as_u16(), body = %message, "Embedding API error");
    EmbeddingError::Api {
        status: status.as_u16(),
        message,
    }
}
