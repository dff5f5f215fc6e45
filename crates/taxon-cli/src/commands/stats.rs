use anyhow::{Context, Result};

use crate::cli::OutputFormat;
use crate::config::CliConfig;
use crate::output;

pub async fn execute(config: CliConfig, format: OutputFormat) -> Result<()> {
    let store = super::open_existing_store(&config)?;
    let stats = store.stats().await.context("Failed to collect statistics")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Table => {
            println!("Taxonomy Statistics\n");
            println!("{}", output::stats_table(&stats));
            println!("\nDatabase: {}", config.database_path().display());
        }
    }
    Ok(())
}
