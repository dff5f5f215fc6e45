//! Taxonomy construction pass
//!
//! Walks a grouped record batch from the root down, creating one taxonomy
//! node per record strictly after its parent. Traversal is a preorder
//! depth-first walk over an explicit stack: siblings are visited in input
//! order and each record's subtree is finished before its next sibling,
//! which is the order the collision suffixes depend on.
//!
//! Records the walk cannot reach from the root (dangling, forward or cyclic
//! parent references) are picked up afterwards in input order. For each one
//! the builder climbs to its topmost unvisited ancestor inside the batch,
//! attaches that ancestor under the root, and descends from there.
//!
//! Only store failures while checking or creating nodes abort a pass.
//! Annotation and embedding problems are logged and counted.

use super::annotation::AnnotationWriter;
use super::grouper::{group_by_parent, ParentKey, RecordTree};
use super::registry::TaxonomyNodeRegistry;
use super::report::{BuildError, BuildOptions, BuildOutcome, BuildReport};
use super::sanitize::sanitize_with_limit;
use crate::traits::{
    serialize_embedding, EmbeddingError, EmbeddingProvider, EmbeddingResult, StorageResult,
    TaxonomyStore,
};
use crate::types::{AnnotationField, InputRecord, NodeRef};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Orchestrates a construction pass against a store and an optional
/// embedding provider.
pub struct TaxonomyBuilder {
    store: Arc<dyn TaxonomyStore>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    options: BuildOptions,
}

impl TaxonomyBuilder {
    pub fn new(store: Arc<dyn TaxonomyStore>) -> Self {
        Self {
            store,
            embedder: None,
            options: BuildOptions::default(),
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Same as [`Self::with_embedder`], for callers whose provider is optional.
    pub fn with_optional_embedder(mut self, embedder: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        self.embedder = embedder;
        self
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn has_embedder(&self) -> bool {
        self.embedder.is_some()
    }

    /// Build the taxonomy for `records` under an existing `root`.
    ///
    /// Not idempotent: running the same batch twice against one store
    /// creates a second, suffixed copy of every node.
    #[tracing::instrument(
        name = "taxonomy_build",
        skip_all,
        fields(records = records.len(), root = %root.name)
    )]
    pub async fn build(
        &self,
        records: &[InputRecord],
        root: &NodeRef,
    ) -> Result<BuildOutcome, BuildError> {
        let tree = group_by_parent(records, self.options.root_parent_sentinel);
        self.build_tree(&tree, TaxonomyNodeRegistry::new(), root)
            .await
    }

    /// Ensure a root class called `root_name` exists, then [`Self::build`].
    pub async fn build_under(
        &self,
        records: &[InputRecord],
        root_name: &str,
    ) -> Result<BuildOutcome, BuildError> {
        let root = self
            .store
            .ensure_root(root_name)
            .await
            .map_err(|source| BuildError::Root {
                name: root_name.to_string(),
                source,
            })?;
        self.build(records, &root).await
    }

    /// Build from an already grouped batch, continuing `registry`.
    ///
    /// Indices already present in `registry` count as processed: their
    /// records are skipped and their names serve as parents.
    pub async fn build_tree(
        &self,
        tree: &RecordTree<'_>,
        registry: TaxonomyNodeRegistry,
        root: &NodeRef,
    ) -> Result<BuildOutcome, BuildError> {
        debug!(
            records = tree.len(),
            parent_groups = tree.group_count(),
            "Grouped records by parent"
        );
        let mut pass = BuildPass {
            store: self.store.as_ref(),
            embedder: self.embedder.as_deref(),
            options: &self.options,
            root,
            registry,
            annotations: AnnotationWriter::new(self.store.as_ref()),
            report: BuildReport {
                records_total: tree.len(),
                ..Default::default()
            },
        };

        match pass.run(tree).await {
            Ok(()) => {
                let report = pass.report;
                info!(
                    nodes_created = report.nodes_created,
                    renamed = report.renamed,
                    root_fallbacks = report.root_fallbacks,
                    embeddings_set = report.embeddings_set,
                    embedding_failures = report.embedding_failures,
                    max_depth = report.max_depth,
                    "Taxonomy build complete"
                );
                Ok(BuildOutcome {
                    registry: pass.registry,
                    report,
                })
            }
            Err(source) => {
                tracing::error!(
                    error = %source,
                    nodes_created = pass.report.nodes_created,
                    "Taxonomy build aborted by store failure"
                );
                Err(BuildError::Store {
                    source,
                    partial: Box::new(BuildOutcome {
                        registry: pass.registry,
                        report: pass.report,
                    }),
                })
            }
        }
    }
}

/// Mutable state of one pass.
struct BuildPass<'b> {
    store: &'b dyn TaxonomyStore,
    embedder: Option<&'b dyn EmbeddingProvider>,
    options: &'b BuildOptions,
    root: &'b NodeRef,
    registry: TaxonomyNodeRegistry,
    annotations: AnnotationWriter<'b, dyn TaxonomyStore + 'b>,
    report: BuildReport,
}

impl<'b> BuildPass<'b> {
    async fn run(&mut self, tree: &RecordTree<'_>) -> StorageResult<()> {
        for duplicate in tree.duplicates() {
            warn!(
                index = duplicate.index,
                name = %duplicate.name,
                "Duplicate record index, keeping the first occurrence"
            );
            self.report.skipped_duplicates += 1;
        }

        self.descend(tree, tree.children(ParentKey::Root)).await?;

        for record in tree.records() {
            if self.registry.contains(record.index) {
                continue;
            }
            let start = self.orphan_ancestor(tree, record);
            self.descend(tree, std::slice::from_ref(&start)).await?;
        }

        Ok(())
    }

    /// Preorder walk from `seeds`, which share the same depth below the root.
    async fn descend<'a>(
        &mut self,
        tree: &RecordTree<'a>,
        seeds: &[&'a InputRecord],
    ) -> StorageResult<()> {
        let mut stack: Vec<(&'a InputRecord, usize)> =
            seeds.iter().rev().map(|record| (*record, 1)).collect();

        while let Some((record, depth)) = stack.pop() {
            // Reached again through a cycle.
            if self.registry.contains(record.index) {
                continue;
            }

            let node = self.place(tree, record).await?;
            self.report.max_depth = self.report.max_depth.max(depth);
            self.annotate(&node, record).await;

            for child in tree.children(ParentKey::Index(record.index)).iter().rev() {
                stack.push((*child, depth + 1));
            }
        }

        Ok(())
    }

    /// Topmost ancestor of `record` that is in the batch and not yet built.
    fn orphan_ancestor<'a>(
        &self,
        tree: &RecordTree<'a>,
        record: &'a InputRecord,
    ) -> &'a InputRecord {
        let mut current = record;
        let mut seen = HashSet::from([record.index]);
        while let ParentKey::Index(parent_index) = tree.parent_key(current) {
            match tree.record(parent_index) {
                Some(parent)
                    if !self.registry.contains(parent.index) && seen.insert(parent.index) =>
                {
                    current = parent;
                }
                _ => break,
            }
        }
        current
    }

    /// Create the node for `record` under its resolved parent.
    async fn place(&mut self, tree: &RecordTree<'_>, record: &InputRecord) -> StorageResult<NodeRef> {
        let parent_name = match tree.parent_key(record) {
            ParentKey::Root => self.root.name.clone(),
            ParentKey::Index(parent_index) => match self.registry.get(parent_index) {
                Some(name) => name.to_string(),
                None => {
                    warn!(
                        index = record.index,
                        parent_index,
                        root = %self.root.name,
                        "Parent index not resolved, attaching under the root"
                    );
                    self.report.root_fallbacks += 1;
                    self.root.name.clone()
                }
            },
        };

        let candidate = sanitize_with_limit(&record.name, self.options.max_name_len);
        let node = self
            .registry
            .resolve_and_create(self.store, self.root, record.index, &parent_name, &candidate)
            .await?;

        self.report.nodes_created += 1;
        if node.name != candidate {
            self.report.renamed += 1;
            debug!(index = record.index, candidate = %candidate, name = %node.name, "Renamed to avoid collision");
        }
        debug!(index = record.index, name = %node.name, parent = %parent_name, "Created taxonomy node");

        Ok(node)
    }

    /// Attach summary and embedding. Never fails the pass.
    async fn annotate(&mut self, node: &NodeRef, record: &InputRecord) {
        let Some(summary) = record.summary() else {
            return;
        };

        if let Err(e) = self
            .annotations
            .set(node, AnnotationField::Summary.as_str(), summary)
            .await
        {
            warn!(index = record.index, name = %node.name, error = %e, "Failed to set summary annotation");
            self.report.annotation_failures += 1;
            return;
        }
        self.report.summaries_set += 1;

        let Some(embedder) = self.embedder else {
            return;
        };

        let vector = match embed(embedder, summary, self.options.embedding_timeout).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(
                    index = record.index,
                    name = %node.name,
                    provider = embedder.provider_name(),
                    error = %e,
                    "Embedding failed, keeping summary only"
                );
                self.report.embedding_failures += 1;
                return;
            }
        };

        match self
            .annotations
            .set(
                node,
                AnnotationField::SummaryEmbedding.as_str(),
                &serialize_embedding(&vector),
            )
            .await
        {
            Ok(()) => self.report.embeddings_set += 1,
            Err(e) => {
                warn!(index = record.index, name = %node.name, error = %e, "Failed to set embedding annotation");
                self.report.annotation_failures += 1;
            }
        }
    }
}

async fn embed(
    embedder: &dyn EmbeddingProvider,
    text: &str,
    timeout: Option<Duration>,
) -> EmbeddingResult<Vec<f32>> {
    let response = match timeout {
        Some(limit) => tokio::time::timeout(limit, embedder.embed(text))
            .await
            .map_err(|_| EmbeddingError::Timeout(limit.as_millis() as u64))??,
        None => embedder.embed(text).await?,
    };

    if response.embedding.is_empty() {
        return Err(EmbeddingError::InvalidResponse(
            "provider returned an empty vector".to_string(),
        ));
    }
    Ok(response.embedding)
}
