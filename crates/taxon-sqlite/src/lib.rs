//! SQLite storage backend for Taxon
//!
//! This crate provides a SQLite-based implementation of the taxonomy store
//! traits defined in `taxon-core`.
//!
//! ## Features
//!
//! - **Durable taxonomy**: classes, annotation fields and values, ontology metadata
//! - **WAL Mode**: Optimized for concurrent read access with write-ahead logging
//! - **Transactional writes**: each store call commits as one immediate transaction
//! - **Versioned schema**: migrations tracked in `schema_migrations`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taxon_sqlite::SqliteTaxonomyStore;
//! use taxon_core::{TaxonomyReader, TaxonomyStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteTaxonomyStore::open("./taxonomy.db")?;
//! let root = store.ensure_root("Thing").await?;
//! store.create_node("Kings", &root.name).await?;
//!
//! assert_eq!(store.children("Thing").await?.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod schema;
pub mod taxonomy_store;

// Re-exports
pub use config::{DbLocation, SqliteConfig};
pub use connection::{DbStats, SqlitePool};
pub use error::{SqliteError, SqliteResult};
pub use taxonomy_store::{generate_ontology_iri, SqliteTaxonomyStore, TaxonomyStats};
