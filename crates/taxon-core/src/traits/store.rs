//! Taxonomy store abstraction
//!
//! The builder only ever talks to a store through these traits. Backends
//! (in-memory, SQLite) live in their own modules or crates and depend on
//! core for the trait definitions.
//!
//! Stores are assumed to be used by a single writer for the duration of a
//! construction pass, and a node created by [`TaxonomyStore::create_node`]
//! must be visible to the next [`TaxonomyStore::node_exists`] call.

use crate::types::{NodeRef, TaxonomyNode};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Common result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage operation errors
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum StorageError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Name already in use: {0}")]
    Conflict(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Storage quota exceeded: {limit} nodes")]
    QuotaExceeded { limit: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }
}

/// Write side of a taxonomy store.
#[async_trait]
pub trait TaxonomyStore: Send + Sync {
    /// Return the root class with the given name, creating it if needed.
    ///
    /// # Errors
    ///
    /// [`StorageError::Conflict`] if `name` is already taken by a class
    /// that has a parent.
    async fn ensure_root(&self, name: &str) -> StorageResult<NodeRef>;

    /// Whether a node with exactly this name exists.
    async fn node_exists(&self, name: &str) -> StorageResult<bool>;

    /// Create `name` as a child of `parent_name`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if the parent does not exist
    /// - [`StorageError::Conflict`] if `name` is already taken
    async fn create_node(&self, name: &str, parent_name: &str) -> StorageResult<NodeRef>;

    /// Register an annotation field. Declaring an existing field is a no-op.
    async fn declare_annotation_field(&self, field: &str) -> StorageResult<()>;

    /// Set `field` on `node`, replacing any previous value.
    ///
    /// The field must have been declared first.
    async fn set_annotation(&self, node: &NodeRef, field: &str, value: &str) -> StorageResult<()>;
}

/// Read side of a taxonomy store, used by consumers and tests.
#[async_trait]
pub trait TaxonomyReader: Send + Sync {
    async fn get_node(&self, name: &str) -> StorageResult<Option<TaxonomyNode>>;

    /// Direct children of `name`, in creation order.
    async fn children(&self, name: &str) -> StorageResult<Vec<TaxonomyNode>>;

    /// Every node, in creation order.
    async fn list_nodes(&self) -> StorageResult<Vec<TaxonomyNode>>;

    async fn annotation_fields(&self) -> StorageResult<Vec<String>>;

    /// Nodes carrying a value for `field`, in creation order.
    async fn nodes_with_annotation(&self, field: &str) -> StorageResult<Vec<TaxonomyNode>>;

    async fn node_count(&self) -> StorageResult<usize>;
}
