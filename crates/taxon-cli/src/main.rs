use anyhow::Result;
use clap::Parser;
use tracing::debug;

use taxon_cli::{
    cli::{Cli, Commands},
    commands,
    config::{CliConfig, CliOverrides},
    logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cli_level = cli.requested_log_level();

    // Load configuration with CLI overrides
    let config = CliConfig::load(CliOverrides {
        config_file: cli.config,
        db_path: cli.db_path,
        embedding_url: cli.embedding_url,
        embedding_model: cli.embedding_model,
    })
    .await?;

    logging::init(cli_level, config.taxon.logging.level.as_deref());
    debug!(source = ?config.source, db = %config.database_path().display(), "Configuration loaded");

    match cli.command {
        Commands::Build {
            input,
            session,
            root,
            sentinel,
            no_embeddings,
        } => {
            commands::build::execute(
                config,
                commands::build::BuildArgs {
                    input,
                    session,
                    root,
                    sentinel,
                    no_embeddings,
                },
            )
            .await?
        }

        Commands::Tree { depth } => commands::inspect::tree(config, depth).await?,

        Commands::Show { name } => commands::inspect::show(config, name).await?,

        Commands::List { annotation, format } => {
            commands::inspect::list(config, annotation, format).await?
        }

        Commands::Export { output, no_vectors } => {
            commands::export::execute(config, output, no_vectors).await?
        }

        Commands::Stats { format } => commands::stats::execute(config, format).await?,

        Commands::Cleanup {
            max_age_hours,
            dry_run,
        } => commands::cleanup::execute(config, max_age_hours, dry_run).await?,

        Commands::Config(cmd) => commands::config::execute(config, cmd).await?,
    }

    Ok(())
}
