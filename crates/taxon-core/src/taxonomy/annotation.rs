//! Annotation writes with lazy field declaration

use crate::traits::{StorageResult, TaxonomyStore};
use crate::types::NodeRef;
use std::collections::HashSet;
use tracing::debug;

/// Wraps a store and declares each annotation field the first time it is
/// written during a pass.
pub struct AnnotationWriter<'s, S: ?Sized> {
    store: &'s S,
    declared: HashSet<String>,
}

impl<'s, S> AnnotationWriter<'s, S>
where
    S: TaxonomyStore + ?Sized,
{
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            declared: HashSet::new(),
        }
    }

    /// Set `field` on `node`, overwriting any previous value.
    pub async fn set(&mut self, node: &NodeRef, field: &str, value: &str) -> StorageResult<()> {
        if !self.declared.contains(field) {
            self.store.declare_annotation_field(field).await?;
            debug!(field, "Declared annotation field");
            self.declared.insert(field.to_string());
        }
        self.store.set_annotation(node, field, value).await
    }

    /// Fields declared through this writer so far.
    pub fn declared(&self) -> impl Iterator<Item = &str> {
        self.declared.iter().map(String::as_str)
    }
}
