//! Taxonomy construction engine
//!
//! Turns a flat clustering batch into a class hierarchy in a
//! [`TaxonomyStore`](crate::traits::TaxonomyStore):
//!
//! - [`sanitize`]: free text to a valid, bounded identifier
//! - [`annotation`]: summary and embedding fields, declared on first use
//! - [`registry`]: record index to final node name, with collision suffixes
//! - [`grouper`]: flat records to a parent-keyed adjacency view
//! - [`builder`]: the top-down construction pass

pub mod annotation;
pub mod builder;
pub mod grouper;
pub mod registry;
pub mod report;
pub mod sanitize;

pub use annotation::AnnotationWriter;
pub use builder::TaxonomyBuilder;
pub use grouper::{group_by_parent, ParentKey, RecordTree};
pub use registry::{collision_candidate, resolve_name, TaxonomyNodeRegistry};
pub use report::{BuildError, BuildOptions, BuildOutcome, BuildReport};
pub use sanitize::{sanitize, sanitize_with_limit, MAX_NAME_LEN, UNNAMED_CLASS};
