use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use taxon_config::ConfigLoader;

use crate::cli::ConfigCommands;
use crate::config::CliConfig;

/// Execute config subcommand
pub async fn execute(config: CliConfig, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Init { path, force } => init(path, force).await,
        ConfigCommands::Show { format } => show(&config, &format),
    }
}

/// Initialize a new config file
async fn init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = match path {
        Some(path) => path,
        None => ConfigLoader::default_config_path()
            .context("Could not determine config file path")?,
    };

    if config_path.exists() && !force {
        println!(
            "{} Config file already exists at: {}",
            "Error:".red().bold(),
            config_path.display()
        );
        println!("Use {} to overwrite", "--force".yellow());
        return Ok(());
    }

    ConfigLoader::create_example(&config_path)
        .await
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    println!(
        "{} Created config file at: {}",
        "Success:".green().bold(),
        config_path.display()
    );
    println!(
        "\n{}",
        "Default values will be used until you customize the config.".dimmed()
    );
    Ok(())
}

/// Show the current effective configuration
fn show(config: &CliConfig, format: &str) -> Result<()> {
    if let Some(source) = &config.source {
        eprintln!("# Loaded from {}", source.display());
    }
    match format {
        "json" => println!("{}", config.display_as_json()?),
        _ => println!("{}", config.display_as_toml()?),
    }
    Ok(())
}
