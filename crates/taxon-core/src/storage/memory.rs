//! In-memory taxonomy store
//!
//! Backs tests and dry runs. Nodes live in an arena indexed by creation
//! order; a name index gives O(1) existence checks.

use crate::traits::{StorageError, StorageResult, TaxonomyReader, TaxonomyStore};
use crate::types::{NodeId, NodeRef, TaxonomyNode};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
struct StoredNode {
    name: String,
    parent: Option<usize>,
    annotations: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct Inner {
    nodes: Vec<StoredNode>,
    by_name: HashMap<String, usize>,
    fields: Vec<String>,
}

impl Inner {
    fn insert(&mut self, name: &str, parent: Option<usize>) -> NodeRef {
        let slot = self.nodes.len();
        self.nodes.push(StoredNode {
            name: name.to_string(),
            parent,
            annotations: BTreeMap::new(),
        });
        self.by_name.insert(name.to_string(), slot);
        NodeRef::new(slot_to_id(slot), name)
    }

    fn materialize(&self, slot: usize) -> TaxonomyNode {
        let node = &self.nodes[slot];
        TaxonomyNode {
            id: slot_to_id(slot),
            name: node.name.clone(),
            parent: node.parent.map(|p| self.nodes[p].name.clone()),
            annotations: node.annotations.clone(),
        }
    }
}

// Ids start at 1 like SQLite rowids.
fn slot_to_id(slot: usize) -> NodeId {
    slot as NodeId + 1
}

/// Operation counters for test assertions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStoreStats {
    pub exists_checks: usize,
    pub nodes_created: usize,
    pub annotations_set: usize,
    pub field_declarations: usize,
}

/// Thread-safe in-memory implementation of [`TaxonomyStore`] and [`TaxonomyReader`].
#[derive(Debug, Default)]
pub struct MemoryTaxonomyStore {
    inner: RwLock<Inner>,
    node_limit: Option<usize>,
    exists_checks: AtomicUsize,
    nodes_created: AtomicUsize,
    annotations_set: AtomicUsize,
    field_declarations: AtomicUsize,
}

impl MemoryTaxonomyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses to hold more than `limit` nodes (root included).
    ///
    /// Creation beyond the limit fails with [`StorageError::QuotaExceeded`].
    pub fn with_node_limit(limit: usize) -> Self {
        Self {
            node_limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn stats(&self) -> MemoryStoreStats {
        MemoryStoreStats {
            exists_checks: self.exists_checks.load(Ordering::Relaxed),
            nodes_created: self.nodes_created.load(Ordering::Relaxed),
            annotations_set: self.annotations_set.load(Ordering::Relaxed),
            field_declarations: self.field_declarations.load(Ordering::Relaxed),
        }
    }

    fn check_quota(&self, inner: &Inner) -> StorageResult<()> {
        match self.node_limit {
            Some(limit) if inner.nodes.len() >= limit => {
                Err(StorageError::QuotaExceeded { limit })
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl TaxonomyStore for MemoryTaxonomyStore {
    async fn ensure_root(&self, name: &str) -> StorageResult<NodeRef> {
        let mut inner = self.inner.write();
        if let Some(&slot) = inner.by_name.get(name) {
            if inner.nodes[slot].parent.is_some() {
                return Err(StorageError::Conflict(name.to_string()));
            }
            return Ok(NodeRef::new(slot_to_id(slot), name));
        }
        self.check_quota(&inner)?;
        self.nodes_created.fetch_add(1, Ordering::Relaxed);
        Ok(inner.insert(name, None))
    }

    async fn node_exists(&self, name: &str) -> StorageResult<bool> {
        self.exists_checks.fetch_add(1, Ordering::Relaxed);
        Ok(self.inner.read().by_name.contains_key(name))
    }

    async fn create_node(&self, name: &str, parent_name: &str) -> StorageResult<NodeRef> {
        let mut inner = self.inner.write();
        let parent = *inner
            .by_name
            .get(parent_name)
            .ok_or_else(|| StorageError::NotFound(parent_name.to_string()))?;
        if inner.by_name.contains_key(name) {
            return Err(StorageError::Conflict(name.to_string()));
        }
        self.check_quota(&inner)?;
        self.nodes_created.fetch_add(1, Ordering::Relaxed);
        Ok(inner.insert(name, Some(parent)))
    }

    async fn declare_annotation_field(&self, field: &str) -> StorageResult<()> {
        self.field_declarations.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.inner.write();
        if !inner.fields.iter().any(|f| f == field) {
            inner.fields.push(field.to_string());
        }
        Ok(())
    }

    async fn set_annotation(&self, node: &NodeRef, field: &str, value: &str) -> StorageResult<()> {
        let mut inner = self.inner.write();
        if !inner.fields.iter().any(|f| f == field) {
            return Err(StorageError::InvalidOperation(format!(
                "annotation field '{}' is not declared",
                field
            )));
        }
        let slot = *inner
            .by_name
            .get(&node.name)
            .ok_or_else(|| StorageError::NotFound(node.name.clone()))?;
        inner.nodes[slot]
            .annotations
            .insert(field.to_string(), value.to_string());
        self.annotations_set.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[async_trait]
impl TaxonomyReader for MemoryTaxonomyStore {
    async fn get_node(&self, name: &str) -> StorageResult<Option<TaxonomyNode>> {
        let inner = self.inner.read();
        Ok(inner.by_name.get(name).map(|&slot| inner.materialize(slot)))
    }

    async fn children(&self, name: &str) -> StorageResult<Vec<TaxonomyNode>> {
        let inner = self.inner.read();
        let Some(&parent) = inner.by_name.get(name) else {
            return Ok(Vec::new());
        };
        Ok((0..inner.nodes.len())
            .filter(|&slot| inner.nodes[slot].parent == Some(parent))
            .map(|slot| inner.materialize(slot))
            .collect())
    }

    async fn list_nodes(&self) -> StorageResult<Vec<TaxonomyNode>> {
        let inner = self.inner.read();
        Ok((0..inner.nodes.len())
            .map(|slot| inner.materialize(slot))
            .collect())
    }

    async fn annotation_fields(&self) -> StorageResult<Vec<String>> {
        Ok(self.inner.read().fields.clone())
    }

    async fn nodes_with_annotation(&self, field: &str) -> StorageResult<Vec<TaxonomyNode>> {
        let inner = self.inner.read();
        Ok((0..inner.nodes.len())
            .filter(|&slot| inner.nodes[slot].annotations.contains_key(field))
            .map(|slot| inner.materialize(slot))
            .collect())
    }

    async fn node_count(&self) -> StorageResult<usize> {
        Ok(self.inner.read().nodes.len())
    }
}
