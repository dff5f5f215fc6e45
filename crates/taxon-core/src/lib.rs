//! Taxon core
//!
//! Domain types, store and embedding traits, and the taxonomy construction
//! engine. Backends (`taxon-sqlite`, `taxon-llm`) implement the traits
//! defined here; core never depends on them.

pub mod storage;
pub mod taxonomy;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use storage::MemoryTaxonomyStore;
pub use taxonomy::{
    group_by_parent, sanitize, BuildError, BuildOptions, BuildOutcome, BuildReport, ParentKey,
    RecordTree, TaxonomyBuilder, TaxonomyNodeRegistry,
};
pub use traits::{
    EmbeddingError, EmbeddingProvider, EmbeddingResponse, EmbeddingResult, StorageError,
    StorageResult, TaxonomyReader, TaxonomyStore,
};
pub use types::{
    parse_records, AnnotationField, InputRecord, NodeId, NodeRef, TaxonomyNode,
    DEFAULT_ROOT_SENTINEL,
};
