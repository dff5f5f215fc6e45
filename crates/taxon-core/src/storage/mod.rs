//! Store implementations that ship with core
//!
//! Durable backends live in their own crates (`taxon-sqlite`); this module
//! only carries the in-memory store used for tests and dry runs.

pub mod memory;

pub use crate::traits::store::{StorageError, StorageResult};
pub use memory::{MemoryStoreStats, MemoryTaxonomyStore};
