//! Domain types shared across crates

pub mod node;
pub mod record;

pub use node::{AnnotationField, NodeId, NodeRef, TaxonomyNode};
pub use record::{parse_records, InputRecord, DEFAULT_ROOT_SENTINEL};
