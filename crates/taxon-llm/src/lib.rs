//! # Taxon LLM
//!
//! Embedding providers for the taxonomy builder.
//!
//! ## Providers
//!
//! - **Ollama**: `POST {endpoint}/api/embed`
//! - **OpenAI**: `POST {endpoint}/embeddings` with bearer auth, also works
//!   with OpenAI-compatible servers
//! - **Mock**: deterministic `blake3`-derived vectors, no network
//!
//! ## Example
//!
//! ```rust,no_run
//! use taxon_config::EmbeddingConfig;
//! use taxon_llm::create_provider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EmbeddingConfig::default();
//!     if let Some(provider) = create_provider(&config)? {
//!         let response = provider.embed("Ruling families").await?;
//!         println!("{} dimensions", response.dimensions);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod embeddings;

pub use embeddings::{create_provider, MockEmbeddingProvider, OllamaProvider, OpenAIProvider};
pub use taxon_core::{EmbeddingError, EmbeddingProvider, EmbeddingResponse, EmbeddingResult};
