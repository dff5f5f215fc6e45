//! Index-to-name registry and collision resolution
//!
//! The registry maps each input record's `index` to the name its taxonomy
//! node finally received. Names are resolved against the store at the
//! moment of creation: if the candidate is taken, a `_1` suffix is grown by
//! one `1` per collision (`Kings_1`, `Kings_11`, ...) until a free name is
//! found. Final names therefore depend on insertion order.

use crate::traits::{StorageResult, TaxonomyStore};
use crate::types::NodeRef;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Name tried on the `attempt`-th collision (1-based).
pub fn collision_candidate(base: &str, attempt: usize) -> String {
    format!("{}_{}", base, "1".repeat(attempt))
}

/// Find the first free name for `candidate` in `store`.
///
/// Returns the candidate itself when it is free. Terminates because each
/// attempt is strictly longer than the last and the store is finite.
pub async fn resolve_name<S>(store: &S, candidate: &str) -> StorageResult<String>
where
    S: TaxonomyStore + ?Sized,
{
    if !store.node_exists(candidate).await? {
        return Ok(candidate.to_string());
    }

    let mut attempt = 1;
    loop {
        let name = collision_candidate(candidate, attempt);
        if !store.node_exists(&name).await? {
            debug!(candidate, resolved = %name, attempt, "Resolved name collision");
            return Ok(name);
        }
        attempt += 1;
    }
}

/// Mapping from record index to the node name it was assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyNodeRegistry {
    names: HashMap<i64, String>,
}

impl TaxonomyNodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: i64) -> Option<&str> {
        self.names.get(&index).map(String::as_str)
    }

    pub fn contains(&self, index: i64) -> bool {
        self.names.contains_key(&index)
    }

    /// Record a final name. Returns the previous name for `index`, if any.
    pub fn insert(&mut self, index: i64, name: impl Into<String>) -> Option<String> {
        self.names.insert(index, name.into())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.names.iter().map(|(index, name)| (*index, name.as_str()))
    }

    /// Entries sorted by record index.
    pub fn sorted(&self) -> Vec<(i64, String)> {
        let mut entries: Vec<_> = self
            .names
            .iter()
            .map(|(index, name)| (*index, name.clone()))
            .collect();
        entries.sort_by_key(|(index, _)| *index);
        entries
    }

    /// Resolve `candidate` against the store, create it under `parent_name`
    /// and record the final name for `index`.
    ///
    /// If `parent_name` does not exist it is first created directly under
    /// `root`. Returns the created node, whose name may differ from
    /// `candidate`.
    pub async fn resolve_and_create<S>(
        &mut self,
        store: &S,
        root: &NodeRef,
        index: i64,
        parent_name: &str,
        candidate: &str,
    ) -> StorageResult<NodeRef>
    where
        S: TaxonomyStore + ?Sized,
    {
        if parent_name != root.name && !store.node_exists(parent_name).await? {
            warn!(
                parent = parent_name,
                root = %root.name,
                "Parent class missing from store, creating it under the root"
            );
            store.create_node(parent_name, &root.name).await?;
        }

        let name = resolve_name(store, candidate).await?;
        let node = store.create_node(&name, parent_name).await?;
        self.insert(index, node.name.clone());
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTaxonomyStore;
    use crate::traits::TaxonomyReader;
    use proptest::prelude::*;

    async fn store_with_root() -> (MemoryTaxonomyStore, NodeRef) {
        let store = MemoryTaxonomyStore::new();
        let root = store.ensure_root("Thing").await.unwrap();
        (store, root)
    }

    #[test]
    fn test_collision_candidates_grow_by_one() {
        assert_eq!(collision_candidate("Kings", 1), "Kings_1");
        assert_eq!(collision_candidate("Kings", 2), "Kings_11");
        assert_eq!(collision_candidate("Kings", 3), "Kings_111");
    }

    #[tokio::test]
    async fn test_free_name_is_used_verbatim() {
        let (store, root) = store_with_root().await;
        let mut registry = TaxonomyNodeRegistry::new();

        let node = registry
            .resolve_and_create(&store, &root, 0, "Thing", "Kings")
            .await
            .unwrap();

        assert_eq!(node.name, "Kings");
        assert_eq!(registry.get(0), Some("Kings"));
    }

    #[tokio::test]
    async fn test_collisions_append_growing_suffix() {
        let (store, root) = store_with_root().await;
        let mut registry = TaxonomyNodeRegistry::new();

        for index in 0..4 {
            registry
                .resolve_and_create(&store, &root, index, "Thing", "Kings")
                .await
                .unwrap();
        }

        assert_eq!(registry.get(0), Some("Kings"));
        assert_eq!(registry.get(1), Some("Kings_1"));
        assert_eq!(registry.get(2), Some("Kings_11"));
        assert_eq!(registry.get(3), Some("Kings_111"));
    }

    #[tokio::test]
    async fn test_candidate_equal_to_root_is_renamed() {
        let (store, root) = store_with_root().await;
        let mut registry = TaxonomyNodeRegistry::new();

        let node = registry
            .resolve_and_create(&store, &root, 0, "Thing", "Thing")
            .await
            .unwrap();
        assert_eq!(node.name, "Thing_1");
    }

    #[tokio::test]
    async fn test_missing_parent_is_created_under_root() {
        let (store, root) = store_with_root().await;
        let mut registry = TaxonomyNodeRegistry::new();

        registry
            .resolve_and_create(&store, &root, 5, "Ghost", "Child")
            .await
            .unwrap();

        let ghost = store.get_node("Ghost").await.unwrap().unwrap();
        assert_eq!(ghost.parent.as_deref(), Some("Thing"));
        let child = store.get_node("Child").await.unwrap().unwrap();
        assert_eq!(child.parent.as_deref(), Some("Ghost"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_sorted_entries() {
        let mut registry = TaxonomyNodeRegistry::new();
        registry.insert(3, "C");
        registry.insert(1, "A");
        assert_eq!(
            registry.sorted(),
            vec![(1, "A".to_string()), (3, "C".to_string())]
        );
    }

    proptest! {
        #[test]
        fn prop_registry_names_are_unique(candidates in prop::collection::vec("[ab]{1,2}", 1..40)) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let (store, root) = store_with_root().await;
                let mut registry = TaxonomyNodeRegistry::new();
                for (index, candidate) in candidates.iter().enumerate() {
                    registry
                        .resolve_and_create(&store, &root, index as i64, "Thing", candidate)
                        .await
                        .unwrap();
                }

                let mut names: Vec<&str> = registry.iter().map(|(_, name)| name).collect();
                names.sort_unstable();
                let before = names.len();
                names.dedup();
                assert_eq!(before, names.len());
                assert_eq!(before, candidates.len());
            });
        }
    }
}
