//! End-to-end tests for the taxonomy construction pass
//!
//! Every test drives `TaxonomyBuilder` through the public API against the
//! in-memory store or the error-injecting mock store.

use std::sync::Arc;
use taxon_core::test_support::{MockEmbedder, MockTaxonomyStore};
use taxon_core::traits::{parse_embedding, TaxonomyReader, TaxonomyStore};
use taxon_core::{
    BuildError, InputRecord, MemoryTaxonomyStore, NodeRef, StorageError, TaxonomyBuilder,
};

async fn memory_store() -> (Arc<MemoryTaxonomyStore>, NodeRef) {
    let store = Arc::new(MemoryTaxonomyStore::new());
    let root = store.ensure_root("Thing").await.unwrap();
    (store, root)
}

fn kings_batch() -> Vec<InputRecord> {
    vec![
        InputRecord::new(0, Some(-1), "Kings").with_summary("Text A"),
        InputRecord::new(1, Some(0), "Kings").with_summary("Text B"),
    ]
}

#[tokio::test]
async fn kings_scenario_produces_deduplicated_chain() {
    let (store, root) = memory_store().await;
    let embedder = Arc::new(MockEmbedder::new(8));

    let outcome = TaxonomyBuilder::new(store.clone())
        .with_embedder(embedder.clone())
        .build(&kings_batch(), &root)
        .await
        .unwrap();

    assert_eq!(outcome.registry.get(0), Some("Kings"));
    assert_eq!(outcome.registry.get(1), Some("Kings_1"));

    let kings = store.get_node("Kings").await.unwrap().unwrap();
    assert_eq!(kings.parent.as_deref(), Some("Thing"));
    assert_eq!(kings.summary(), Some("Text A"));

    let kings_1 = store.get_node("Kings_1").await.unwrap().unwrap();
    assert_eq!(kings_1.parent.as_deref(), Some("Kings"));
    assert_eq!(kings_1.summary(), Some("Text B"));

    let stored = parse_embedding(kings_1.summary_embedding().unwrap()).unwrap();
    assert_eq!(stored, embedder.vector_for("Text B"));

    let report = outcome.report;
    assert_eq!(report.records_total, 2);
    assert_eq!(report.nodes_created, 2);
    assert_eq!(report.renamed, 1);
    assert_eq!(report.summaries_set, 2);
    assert_eq!(report.embeddings_set, 2);
    assert_eq!(report.max_depth, 2);
    assert_eq!(embedder.call_count(), 2);
}

#[tokio::test]
async fn sentinel_parents_attach_to_root() {
    let (store, root) = memory_store().await;
    let records = vec![
        InputRecord::new(10, Some(-1), "Alpha"),
        InputRecord::new(11, None, "Beta"),
        InputRecord::new(12, Some(-1), "Gamma"),
    ];

    let outcome = TaxonomyBuilder::new(store.clone())
        .build(&records, &root)
        .await
        .unwrap();

    assert_eq!(outcome.report.root_fallbacks, 0);
    let children: Vec<String> = store
        .children("Thing")
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.name)
        .collect();
    assert_eq!(children, vec!["Alpha", "Beta", "Gamma"]);
}

#[tokio::test]
async fn nested_class_cannot_serve_as_root() {
    let store = Arc::new(MemoryTaxonomyStore::new());
    let builder = TaxonomyBuilder::new(store.clone());
    builder
        .build_under(&[InputRecord::new(0, Some(-1), "Kings")], "Thing")
        .await
        .unwrap();

    let err = builder
        .build_under(&[InputRecord::new(0, Some(-1), "Queens")], "Kings")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BuildError::Root { ref name, source: StorageError::Conflict(_) } if name == "Kings"
    ));
    assert!(err.partial().is_none());
    assert!(!store.node_exists("Queens").await.unwrap());
    let kings = store.get_node("Kings").await.unwrap().unwrap();
    assert_eq!(kings.parent.as_deref(), Some("Thing"));
}

#[tokio::test]
async fn missing_summary_creates_bare_node() {
    let (store, root) = memory_store().await;
    let embedder = Arc::new(MockEmbedder::new(4));
    let records = vec![
        InputRecord::new(0, None, "Bare"),
        InputRecord::new(1, None, "Blank").with_summary("   "),
    ];

    let outcome = TaxonomyBuilder::new(store.clone())
        .with_embedder(embedder.clone())
        .build(&records, &root)
        .await
        .unwrap();

    for name in ["Bare", "Blank"] {
        let node = store.get_node(name).await.unwrap().unwrap();
        assert!(node.summary().is_none());
        assert!(node.summary_embedding().is_none());
    }
    assert_eq!(outcome.report.nodes_created, 2);
    assert_eq!(outcome.report.summaries_set, 0);
    assert_eq!(embedder.call_count(), 0);
    assert!(store.annotation_fields().await.unwrap().is_empty());
}

#[tokio::test]
async fn dangling_parent_falls_back_to_root() {
    let (store, root) = memory_store().await;
    let records = vec![
        InputRecord::new(0, Some(-1), "Known"),
        InputRecord::new(1, Some(42), "Lost"),
        InputRecord::new(2, Some(1), "LostChild"),
    ];

    let outcome = TaxonomyBuilder::new(store.clone())
        .build(&records, &root)
        .await
        .unwrap();

    assert_eq!(outcome.registry.len(), 3);
    assert_eq!(outcome.report.root_fallbacks, 1);

    let lost = store.get_node("Lost").await.unwrap().unwrap();
    assert_eq!(lost.parent.as_deref(), Some("Thing"));
    let child = store.get_node("LostChild").await.unwrap().unwrap();
    assert_eq!(child.parent.as_deref(), Some("Lost"));
}

#[tokio::test]
async fn forward_reference_keeps_structure() {
    let (store, root) = memory_store().await;
    // The child is listed before a parent that is itself dangling.
    let records = vec![
        InputRecord::new(5, Some(6), "Child"),
        InputRecord::new(6, Some(99), "Parent"),
    ];

    let outcome = TaxonomyBuilder::new(store.clone())
        .build(&records, &root)
        .await
        .unwrap();

    assert_eq!(outcome.report.root_fallbacks, 1);
    let child = store.get_node("Child").await.unwrap().unwrap();
    assert_eq!(child.parent.as_deref(), Some("Parent"));
    let parent = store.get_node("Parent").await.unwrap().unwrap();
    assert_eq!(parent.parent.as_deref(), Some("Thing"));
}

#[tokio::test]
async fn reprocessing_grows_suffixes() {
    let (store, root) = memory_store().await;
    let builder = TaxonomyBuilder::new(store.clone());
    let records = vec![
        InputRecord::new(0, None, "Dynasty"),
        InputRecord::new(1, Some(0), "Ruler"),
    ];

    let mut previous_len = 0;
    for run in 0..4 {
        let outcome = builder.build(&records, &root).await.unwrap();
        let name = outcome.registry.get(0).unwrap().to_string();
        if run == 0 {
            assert_eq!(name, "Dynasty");
        } else {
            assert!(name.len() > previous_len, "{} should be longer", name);
            assert_eq!(outcome.report.renamed, 2);
        }
        previous_len = name.len();

        let ruler = outcome.registry.get(1).unwrap();
        let node = store.get_node(ruler).await.unwrap().unwrap();
        assert_eq!(node.parent.as_deref(), Some(name.as_str()));
    }

    assert_eq!(store.node_count().await.unwrap(), 1 + 4 * 2);
    assert!(store.node_exists("Dynasty_111").await.unwrap());
    assert!(store.node_exists("Ruler_111").await.unwrap());
}

#[tokio::test]
async fn duplicate_indices_keep_first_occurrence() {
    let (store, root) = memory_store().await;
    let records = vec![
        InputRecord::new(0, None, "First"),
        InputRecord::new(0, None, "Second"),
        InputRecord::new(1, Some(0), "Child"),
    ];

    let outcome = TaxonomyBuilder::new(store.clone())
        .build(&records, &root)
        .await
        .unwrap();

    assert_eq!(outcome.report.skipped_duplicates, 1);
    assert_eq!(outcome.report.nodes_created, 2);
    assert_eq!(outcome.registry.get(0), Some("First"));
    assert!(!store.node_exists("Second").await.unwrap());
    let child = store.get_node("Child").await.unwrap().unwrap();
    assert_eq!(child.parent.as_deref(), Some("First"));
}

#[tokio::test]
async fn names_are_sanitized() {
    let (store, root) = memory_store().await;
    let records = vec![
        InputRecord::new(0, None, "Nhà Trần (1225–1400)"),
        InputRecord::new(1, None, "1945 revolution"),
        InputRecord::new(2, None, "???"),
    ];

    let outcome = TaxonomyBuilder::new(store.clone())
        .build(&records, &root)
        .await
        .unwrap();

    assert_eq!(outcome.registry.get(0), Some("Nhà_Trần_12251400"));
    assert_eq!(outcome.registry.get(1), Some("_1945_revolution"));
    assert_eq!(outcome.registry.get(2), Some("UnnamedClass"));
}

#[tokio::test]
async fn embedding_failure_keeps_summary() {
    let (store, root) = memory_store().await;
    let embedder = Arc::new(MockEmbedder::new(4).fail_on("Text B"));

    let outcome = TaxonomyBuilder::new(store.clone())
        .with_embedder(embedder)
        .build(&kings_batch(), &root)
        .await
        .unwrap();

    assert_eq!(outcome.report.embeddings_set, 1);
    assert_eq!(outcome.report.embedding_failures, 1);

    let failed = store.get_node("Kings_1").await.unwrap().unwrap();
    assert_eq!(failed.summary(), Some("Text B"));
    assert!(failed.summary_embedding().is_none());

    let ok = store.get_node("Kings").await.unwrap().unwrap();
    assert!(ok.summary_embedding().is_some());
}

#[tokio::test]
async fn unavailable_embedding_service_never_aborts() {
    let (store, root) = memory_store().await;

    let outcome = TaxonomyBuilder::new(store.clone())
        .with_embedder(Arc::new(MockEmbedder::unavailable()))
        .build(&kings_batch(), &root)
        .await
        .unwrap();

    assert_eq!(outcome.report.nodes_created, 2);
    assert_eq!(outcome.report.summaries_set, 2);
    assert_eq!(outcome.report.embedding_failures, 2);
    assert!(store
        .nodes_with_annotation("summary_embedding")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn annotation_failures_are_recoverable() {
    let store = Arc::new(MockTaxonomyStore::new());
    let root = store.ensure_root("Thing").await.unwrap();
    store.set_fail_annotations(true);

    let outcome = TaxonomyBuilder::new(store.clone())
        .with_embedder(Arc::new(MockEmbedder::new(4)))
        .build(&kings_batch(), &root)
        .await
        .unwrap();

    assert_eq!(outcome.report.nodes_created, 2);
    assert_eq!(outcome.report.annotation_failures, 2);
    assert_eq!(outcome.report.summaries_set, 0);
    assert!(store.get_node("Kings_1").await.unwrap().is_some());
}

#[tokio::test]
async fn store_failure_aborts_with_partial_result() {
    let store = Arc::new(MockTaxonomyStore::new());
    let root = store.ensure_root("Thing").await.unwrap();
    store.fail_creates_after(2);

    let records = vec![
        InputRecord::new(0, None, "A"),
        InputRecord::new(1, Some(0), "B"),
        InputRecord::new(2, Some(1), "C"),
        InputRecord::new(3, None, "D"),
    ];

    let err = TaxonomyBuilder::new(store.clone())
        .build(&records, &root)
        .await
        .unwrap_err();

    assert!(matches!(err.storage_error(), StorageError::Backend(_)));
    let partial = err.partial().unwrap();
    assert_eq!(partial.report.nodes_created, 2);
    assert_eq!(partial.report.unprocessed(), 2);
    assert_eq!(partial.registry.get(0), Some("A"));
    assert_eq!(partial.registry.get(1), Some("B"));
    assert!(!partial.registry.contains(2));
    assert!(!store.node_exists("D").await.unwrap());
}

#[tokio::test]
async fn quota_exceeded_is_fatal() {
    // Root plus one node fit.
    let store = Arc::new(MemoryTaxonomyStore::with_node_limit(2));
    let root = store.ensure_root("Thing").await.unwrap();

    let result = TaxonomyBuilder::new(store.clone())
        .build(&kings_batch(), &root)
        .await;

    match result {
        Err(BuildError::Store { source, partial }) => {
            assert!(matches!(source, StorageError::QuotaExceeded { limit: 2 }));
            assert_eq!(partial.registry.len(), 1);
        }
        other => panic!("expected store error, got {:?}", other.map(|o| o.report)),
    }
}

#[tokio::test]
async fn existence_check_failure_is_fatal() {
    let store = Arc::new(MockTaxonomyStore::new());
    let root = store.ensure_root("Thing").await.unwrap();
    store.set_fail_exists_checks(true);

    let err = TaxonomyBuilder::new(store)
        .build(&kings_batch(), &root)
        .await
        .unwrap_err();

    assert!(matches!(err.storage_error(), StorageError::Connection(_)));
    assert_eq!(err.partial().unwrap().report.nodes_created, 0);
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    let (store, root) = memory_store().await;

    let outcome = TaxonomyBuilder::new(store.clone())
        .build(&[], &root)
        .await
        .unwrap();

    assert!(outcome.registry.is_empty());
    assert_eq!(outcome.report.max_depth, 0);
    assert_eq!(store.node_count().await.unwrap(), 1);
}
