//! Read-only views of a stored taxonomy: `tree`, `show` and `list`

use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::HashMap;
use taxon_core::traits::parse_embedding;
use taxon_core::{TaxonomyNode, TaxonomyReader};

use crate::cli::OutputFormat;
use crate::config::CliConfig;
use crate::output;

/// Group nodes under their parent's name, keeping creation order.
pub(crate) fn children_index(nodes: &[TaxonomyNode]) -> HashMap<&str, Vec<&TaxonomyNode>> {
    let mut index: HashMap<&str, Vec<&TaxonomyNode>> = HashMap::new();
    for node in nodes {
        if let Some(parent) = node.parent.as_deref() {
            index.entry(parent).or_default().push(node);
        }
    }
    index
}

/// Render the hierarchy as indented lines, roots first.
pub fn render_tree(nodes: &[TaxonomyNode], max_depth: Option<usize>) -> Vec<String> {
    let children = children_index(nodes);
    let mut lines = Vec::with_capacity(nodes.len());

    let mut stack: Vec<(&TaxonomyNode, usize)> = nodes
        .iter()
        .filter(|n| n.is_root())
        .rev()
        .map(|n| (n, 0))
        .collect();

    while let Some((node, depth)) = stack.pop() {
        let marker = if node.summary_embedding().is_some() { " *" } else { "" };
        lines.push(format!("{}{}{}", "  ".repeat(depth), node.name, marker));

        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }
        if let Some(kids) = children.get(node.name.as_str()) {
            stack.extend(kids.iter().rev().map(|kid| (*kid, depth + 1)));
        }
    }
    lines
}

pub async fn tree(config: CliConfig, depth: Option<usize>) -> Result<()> {
    let store = super::open_existing_store(&config)?;
    let nodes = store.list_nodes().await.context("Failed to read classes")?;

    if nodes.is_empty() {
        println!("{}", "Taxonomy is empty.".dimmed());
        return Ok(());
    }
    for line in render_tree(&nodes, depth) {
        println!("{}", line);
    }
    Ok(())
}

pub async fn show(config: CliConfig, name: String) -> Result<()> {
    let store = super::open_existing_store(&config)?;
    let node = store
        .get_node(&name)
        .await
        .context("Failed to read class")?
        .with_context(|| format!("Class not found: {}", name))?;
    let children = store.children(&name).await.context("Failed to read children")?;

    println!("{} {}", "Class:".bold(), node.name);
    println!(
        "{} {}",
        "Parent:".bold(),
        node.parent.as_deref().unwrap_or("(root)")
    );
    if let Some(summary) = node.summary() {
        println!("{} {}", "Summary:".bold(), summary);
    }
    if let Some(raw) = node.summary_embedding() {
        match parse_embedding(raw) {
            Ok(vector) => println!("{} {} dimensions", "Embedding:".bold(), vector.len()),
            Err(_) => println!("{} {}", "Embedding:".bold(), "unreadable".red()),
        }
    }
    for (field, value) in &node.annotations {
        if field != "summary" && field != "summary_embedding" {
            println!("{} {}", format!("{}:", field).bold(), value);
        }
    }
    if !children.is_empty() {
        let names: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();
        println!("{} {}", "Children:".bold(), names.join(", "));
    }
    Ok(())
}

pub async fn list(
    config: CliConfig,
    annotation: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let store = super::open_existing_store(&config)?;
    let nodes = match annotation.as_deref() {
        Some(field) => store.nodes_with_annotation(field).await,
        None => store.list_nodes().await,
    }
    .context("Failed to read classes")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&nodes)?),
        OutputFormat::Table => {
            println!("{}", output::nodes_table(&nodes));
            println!("{} classes", nodes.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn node(id: i64, name: &str, parent: Option<&str>) -> TaxonomyNode {
        TaxonomyNode {
            id,
            name: name.to_string(),
            parent: parent.map(str::to_string),
            annotations: BTreeMap::new(),
        }
    }

    #[test]
    fn test_render_tree_preorder() {
        let nodes = vec![
            node(1, "Thing", None),
            node(2, "Kings", Some("Thing")),
            node(3, "Queens", Some("Thing")),
            node(4, "Kings_1", Some("Kings")),
        ];

        assert_eq!(
            render_tree(&nodes, None),
            vec!["Thing", "  Kings", "    Kings_1", "  Queens"]
        );
        assert_eq!(render_tree(&nodes, Some(1)), vec!["Thing", "  Kings", "  Queens"]);
    }
}
