//! Core abstractions (traits)
//!
//! Core defines the traits; backends depend on core and implement them.
//!
//! ```text
//! ┌──────────────────┐
//! │ TaxonomyBuilder  │  ← drives construction through trait objects
//! │  - TaxonomyStore │
//! │  - Embedding     │
//! └────────┬─────────┘
//!          │ uses (trait bounds)
//!          ▼
//! ┌──────────────────┐
//! │ Implementations  │
//! │  - Memory        │
//! │  - SQLite        │
//! │  - Ollama/OpenAI │
//! └──────────────────┘
//! ```

pub mod embedding;
pub mod store;

pub use embedding::{
    parse_embedding, serialize_embedding, EmbeddingError, EmbeddingProvider, EmbeddingResponse,
    EmbeddingResult,
};
pub use store::{StorageError, StorageResult, TaxonomyReader, TaxonomyStore};
