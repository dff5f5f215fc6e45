use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use taxon_config::EmbeddingProviderType;
use taxon_core::{parse_records, BuildError, BuildOptions, TaxonomyBuilder};
use tracing::info;

use crate::config::CliConfig;
use crate::output;

#[derive(Debug, Clone, Default)]
pub struct BuildArgs {
    pub input: PathBuf,
    pub session: Option<String>,
    pub root: Option<String>,
    pub sentinel: Option<i64>,
    pub no_embeddings: bool,
}

pub async fn execute(config: CliConfig, args: BuildArgs) -> Result<()> {
    let mut settings = config.taxon.clone();
    if args.no_embeddings {
        settings.embedding.provider = EmbeddingProviderType::None;
    }
    settings.validate().context("Invalid configuration")?;

    let contents = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read record file: {}", args.input.display()))?;
    let records = parse_records(&contents)
        .with_context(|| format!("Failed to parse record file: {}", args.input.display()))?;

    let db_path = config.build_database_path(args.session.as_deref());
    let store = Arc::new(super::open_store(&config, &db_path)?);
    let iri = store
        .ensure_ontology_iri(&settings.build.iri_base)
        .await
        .context("Failed to assign ontology IRI")?;

    let embedder = if settings.embeddings_active() {
        taxon_llm::create_provider(&settings.embedding)
            .context("Failed to set up embedding provider")?
    } else {
        None
    };

    let options = BuildOptions {
        root_parent_sentinel: args
            .sentinel
            .unwrap_or(settings.build.root_parent_sentinel),
        max_name_len: settings.build.max_name_len,
        embedding_timeout: Some(Duration::from_secs(settings.embedding.timeout_seconds)),
    };
    let root = args
        .root
        .unwrap_or_else(|| settings.build.root_class.clone());

    let builder = TaxonomyBuilder::new(store.clone())
        .with_optional_embedder(embedder)
        .with_options(options);

    info!(
        records = records.len(),
        db = %db_path.display(),
        embeddings = builder.has_embedder(),
        "Starting taxonomy build"
    );

    match builder.build_under(&records, &root).await {
        Ok(outcome) => {
            println!(
                "{} Built taxonomy under '{}' in {}",
                "Success:".green().bold(),
                root,
                db_path.display()
            );
            println!("Ontology IRI: {}", iri);
            println!("{}", output::report_table(&outcome.report));
            if outcome.report.embedding_failures > 0 {
                println!(
                    "{}",
                    "Some embeddings failed; summaries were stored without vectors.".yellow()
                );
            }
            Ok(())
        }
        Err(err) => {
            if let Some(partial) = err.partial() {
                println!("{}", output::report_table(&partial.report));
                eprintln!(
                    "{} Build aborted after committing {} nodes to {}; {} of {} records not processed",
                    "Error:".red().bold(),
                    partial.report.nodes_created,
                    db_path.display(),
                    partial.report.unprocessed(),
                    partial.report.records_total
                );
            }
            Err(describe(err))
        }
    }
}

fn describe(err: BuildError) -> anyhow::Error {
    let message = match &err {
        BuildError::Store { .. } => "Taxonomy build failed",
        BuildError::Root { .. } => "Could not create the root class",
    };
    anyhow::Error::new(err).context(message)
}
