//! Deterministic embedding provider
//!
//! Vectors come from a `blake3` extendable-output digest of the text, so the
//! same text always maps to the same vector. Useful for offline runs and for
//! tests that go through [`super::create_provider`].

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use taxon_core::{EmbeddingError, EmbeddingProvider, EmbeddingResponse, EmbeddingResult};

const MODEL_NAME: &str = "mock-blake3";

#[derive(Debug)]
pub struct MockEmbeddingProvider {
    dimensions: usize,
    failing: bool,
    calls: AtomicUsize,
}

impl MockEmbeddingProvider {
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions,
            failing: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// A provider whose every call fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::with_dimensions(8)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// The vector returned for `text`, each component in `[-1, 1]`.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut reader = blake3::Hasher::new()
            .update(text.as_bytes())
            .finalize_xof();
        let mut bytes = vec![0u8; self.dimensions * 2];
        reader.fill(&mut bytes);

        bytes
            .chunks_exact(2)
            .map(|pair| {
                let raw = u16::from_le_bytes([pair[0], pair[1]]);
                raw as f32 / u16::MAX as f32 * 2.0 - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> EmbeddingResult<EmbeddingResponse> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.failing {
            return Err(EmbeddingError::Unavailable(
                "mock provider configured to fail".to_string(),
            ));
        }
        Ok(EmbeddingResponse::new(self.vector_for(text), MODEL_NAME))
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic_vectors() {
        let provider = MockEmbeddingProvider::with_dimensions(32);

        let a = provider.embed("Ruling families").await.unwrap();
        let b = provider.embed("Ruling families").await.unwrap();
        let c = provider.embed("Text B").await.unwrap();

        assert_eq!(a.embedding, b.embedding);
        assert_ne!(a.embedding, c.embedding);
        assert_eq!(a.dimensions, 32);
        assert!(a.embedding.iter().all(|v| (-1.0..=1.0).contains(v)));
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let provider = MockEmbeddingProvider::failing();
        let err = provider.embed("anything").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Unavailable(_)));
        assert_eq!(provider.call_count(), 1);
    }
}
