//! Nested JSON export for downstream consumers

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use taxon_core::traits::parse_embedding;
use taxon_core::{TaxonomyNode, TaxonomyReader};

use super::inspect::children_index;
use crate::config::CliConfig;

#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub ontology_iri: Option<String>,
    pub class_count: usize,
    pub roots: Vec<ExportNode>,
}

#[derive(Debug, Serialize)]
pub struct ExportNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub has_embedding: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub children: Vec<ExportNode>,
}

/// Nest the flat node list under its roots.
pub fn build_document(
    nodes: &[TaxonomyNode],
    ontology_iri: Option<String>,
    include_vectors: bool,
) -> ExportDocument {
    let children = children_index(nodes);

    fn nest(
        node: &TaxonomyNode,
        children: &std::collections::HashMap<&str, Vec<&TaxonomyNode>>,
        include_vectors: bool,
    ) -> ExportNode {
        let raw_embedding = node.summary_embedding();
        ExportNode {
            name: node.name.clone(),
            summary: node.summary().map(str::to_string),
            has_embedding: raw_embedding.is_some(),
            embedding: raw_embedding
                .filter(|_| include_vectors)
                .and_then(|raw| parse_embedding(raw).ok()),
            children: children
                .get(node.name.as_str())
                .map(|kids| {
                    kids.iter()
                        .map(|kid| nest(kid, children, include_vectors))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    ExportDocument {
        ontology_iri,
        class_count: nodes.len(),
        roots: nodes
            .iter()
            .filter(|n| n.is_root())
            .map(|root| nest(root, &children, include_vectors))
            .collect(),
    }
}

pub async fn execute(config: CliConfig, output: Option<PathBuf>, no_vectors: bool) -> Result<()> {
    let store = super::open_existing_store(&config)?;
    let nodes = store.list_nodes().await.context("Failed to read classes")?;
    let iri = store.ontology_iri().await.context("Failed to read ontology IRI")?;

    let document = build_document(&nodes, iri, !no_vectors);
    let json = serde_json::to_string_pretty(&document)?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("Failed to write export: {}", path.display()))?;
            eprintln!(
                "{} Exported {} classes to {}",
                "Success:".green().bold(),
                document.class_count,
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}
