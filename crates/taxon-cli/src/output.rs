//! Table rendering shared by the commands

use comfy_table::{Cell, Color, Table};
use taxon_core::{BuildReport, TaxonomyNode};
use taxon_sqlite::TaxonomyStats;

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn count_cell(value: usize, warn: bool) -> Cell {
    let cell = Cell::new(value);
    if warn && value > 0 {
        cell.fg(Color::Yellow)
    } else {
        cell
    }
}

pub fn report_table(report: &BuildReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Count"]);

    let rows = [
        ("Records", report.records_total, false),
        ("Nodes created", report.nodes_created, false),
        ("Renamed (collisions)", report.renamed, false),
        ("Attached to root", report.root_fallbacks, true),
        ("Duplicates skipped", report.skipped_duplicates, true),
        ("Summaries", report.summaries_set, false),
        ("Embeddings", report.embeddings_set, false),
        ("Embedding failures", report.embedding_failures, true),
        ("Annotation failures", report.annotation_failures, true),
        ("Max depth", report.max_depth, false),
    ];
    for (label, value, warn) in rows {
        table.add_row(vec![Cell::new(label), count_cell(value, warn)]);
    }
    table
}

pub fn nodes_table(nodes: &[TaxonomyNode]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Class", "Parent", "Summary", "Embedding"]);

    for node in nodes {
        let embedded = if node.summary_embedding().is_some() {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no")
        };
        table.add_row(vec![
            Cell::new(&node.name),
            Cell::new(node.parent.as_deref().unwrap_or("-")),
            Cell::new(truncate(node.summary().unwrap_or(""), 60)),
            embedded,
        ]);
    }
    table
}

pub fn stats_table(stats: &TaxonomyStats) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Property", "Value"]);

    let size_kb = stats.db.total_size_bytes as f64 / 1024.0;
    let rows = [
        (
            "Ontology IRI",
            stats.ontology_iri.clone().unwrap_or_else(|| "-".to_string()),
        ),
        (
            "Created",
            stats.created_at.clone().unwrap_or_else(|| "-".to_string()),
        ),
        ("Classes", stats.class_count.to_string()),
        ("Roots", stats.root_count.to_string()),
        ("Max depth", stats.max_depth.to_string()),
        ("With summary", stats.summary_count.to_string()),
        ("With embedding", stats.embedding_count.to_string()),
        ("Annotation fields", stats.annotation_fields.join(", ")),
        ("Database size", format!("{:.1} KiB", size_kb)),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long summary text", 10), "a long ...");
        assert_eq!(truncate("日本語のテキスト", 5), "日本...");
    }

    #[test]
    fn test_report_table_lists_counters() {
        let report = BuildReport {
            records_total: 3,
            nodes_created: 2,
            skipped_duplicates: 1,
            ..Default::default()
        };
        let rendered = report_table(&report).to_string();
        assert!(rendered.contains("Nodes created"));
        assert!(rendered.contains("Duplicates skipped"));
    }
}
