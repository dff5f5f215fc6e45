//! Mock implementations for testing
//!
//! These mocks are:
//!
//! - **Deterministic**: the same input always yields the same output
//! - **Observable**: calls are counted for test assertions
//! - **Configurable**: failures can be injected per call kind
//!
//! # Examples
//!
//! ```rust
//! use taxon_core::test_support::mocks::MockEmbedder;
//! use taxon_core::traits::EmbeddingProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let embedder = MockEmbedder::new(8);
//! let a = embedder.embed("kings").await?;
//! let b = embedder.embed("kings").await?;
//!
//! assert_eq!(a.embedding, b.embedding);
//! assert_eq!(embedder.call_count(), 2);
//! # Ok(())
//! # }
//! ```

use crate::storage::MemoryTaxonomyStore;
use crate::traits::{
    EmbeddingError, EmbeddingProvider, EmbeddingResponse, EmbeddingResult, StorageError,
    StorageResult, TaxonomyReader, TaxonomyStore,
};
use crate::types::{NodeRef, TaxonomyNode};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Mock Embedder
// ============================================================================

/// Deterministic embedding provider.
///
/// Vectors are derived from the bytes of the input text, so identical texts
/// embed identically and different texts almost always differ.
#[derive(Debug, Default)]
pub struct MockEmbedder {
    dimensions: usize,
    calls: AtomicUsize,
    fail_all: bool,
    fail_on: Mutex<HashSet<String>>,
    delay: Option<Duration>,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            ..Default::default()
        }
    }

    /// An embedder whose every call fails as if the service were down.
    pub fn unavailable() -> Self {
        Self {
            dimensions: 8,
            fail_all: true,
            ..Default::default()
        }
    }

    /// Fail only for this exact input text.
    pub fn fail_on(self, text: impl Into<String>) -> Self {
        self.fail_on.lock().insert(text.into());
        self
    }

    /// Sleep before answering, for timeout tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// The vector this mock returns for `text`.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let bytes = text.as_bytes();
        (0..self.dimensions)
            .map(|i| {
                let acc = bytes
                    .iter()
                    .enumerate()
                    .fold(i as u32 + 1, |acc, (j, &b)| {
                        acc.wrapping_mul(31).wrapping_add(b as u32 ^ (j as u32 + i as u32))
                    });
                (acc % 2000) as f32 / 1000.0 - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> EmbeddingResult<EmbeddingResponse> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_all {
            return Err(EmbeddingError::Unavailable(
                "mock embedding service is down".to_string(),
            ));
        }
        if self.fail_on.lock().contains(text) {
            return Err(EmbeddingError::Api {
                status: 500,
                message: format!("mock failure for '{}'", text),
            });
        }

        Ok(EmbeddingResponse::new(self.vector_for(text), "mock-embed"))
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ============================================================================
// Mock Store
// ============================================================================

#[derive(Debug, Default)]
struct FailureState {
    annotations: bool,
    creates_after: Option<usize>,
    exists_checks: bool,
}

/// Memory store with error injection.
///
/// # Examples
///
/// ```rust
/// use taxon_core::test_support::mocks::MockTaxonomyStore;
/// use taxon_core::traits::TaxonomyStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MockTaxonomyStore::new();
/// store.ensure_root("Thing").await?;
///
/// store.fail_creates_after(0);
/// assert!(store.create_node("Kings", "Thing").await.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTaxonomyStore {
    inner: Arc<MemoryTaxonomyStore>,
    failures: Arc<Mutex<FailureState>>,
    creates: Arc<AtomicUsize>,
}

impl MockTaxonomyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The backing store, for reading results back.
    pub fn inner(&self) -> &MemoryTaxonomyStore {
        &self.inner
    }

    /// Make every `declare_annotation_field` and `set_annotation` fail.
    pub fn set_fail_annotations(&self, enabled: bool) {
        self.failures.lock().annotations = enabled;
    }

    /// Let `count` more `create_node` calls succeed, then fail all others.
    pub fn fail_creates_after(&self, count: usize) {
        let done = self.creates.load(Ordering::Relaxed);
        self.failures.lock().creates_after = Some(done + count);
    }

    pub fn set_fail_exists_checks(&self, enabled: bool) {
        self.failures.lock().exists_checks = enabled;
    }

    /// Clear all injected failures.
    pub fn reset_failures(&self) {
        *self.failures.lock() = FailureState::default();
    }
}

#[async_trait]
impl TaxonomyStore for MockTaxonomyStore {
    async fn ensure_root(&self, name: &str) -> StorageResult<NodeRef> {
        self.inner.ensure_root(name).await
    }

    async fn node_exists(&self, name: &str) -> StorageResult<bool> {
        if self.failures.lock().exists_checks {
            return Err(StorageError::Connection("simulated connection loss".to_string()));
        }
        self.inner.node_exists(name).await
    }

    async fn create_node(&self, name: &str, parent_name: &str) -> StorageResult<NodeRef> {
        if let Some(limit) = self.failures.lock().creates_after {
            if self.creates.load(Ordering::Relaxed) >= limit {
                return Err(StorageError::backend("simulated disk full"));
            }
        }
        let node = self.inner.create_node(name, parent_name).await?;
        self.creates.fetch_add(1, Ordering::Relaxed);
        Ok(node)
    }

    async fn declare_annotation_field(&self, field: &str) -> StorageResult<()> {
        if self.failures.lock().annotations {
            return Err(StorageError::Query("simulated annotation failure".to_string()));
        }
        self.inner.declare_annotation_field(field).await
    }

    async fn set_annotation(&self, node: &NodeRef, field: &str, value: &str) -> StorageResult<()> {
        if self.failures.lock().annotations {
            return Err(StorageError::Query("simulated annotation failure".to_string()));
        }
        self.inner.set_annotation(node, field, value).await
    }
}

#[async_trait]
impl TaxonomyReader for MockTaxonomyStore {
    async fn get_node(&self, name: &str) -> StorageResult<Option<TaxonomyNode>> {
        self.inner.get_node(name).await
    }

    async fn children(&self, name: &str) -> StorageResult<Vec<TaxonomyNode>> {
        self.inner.children(name).await
    }

    async fn list_nodes(&self) -> StorageResult<Vec<TaxonomyNode>> {
        self.inner.list_nodes().await
    }

    async fn annotation_fields(&self) -> StorageResult<Vec<String>> {
        self.inner.annotation_fields().await
    }

    async fn nodes_with_annotation(&self, field: &str) -> StorageResult<Vec<TaxonomyNode>> {
        self.inner.nodes_with_annotation(field).await
    }

    async fn node_count(&self) -> StorageResult<usize> {
        self.inner.node_count().await
    }
}
