use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Parser)]
#[command(name = "taxon")]
#[command(about = "taxon - build a class taxonomy from hierarchical clustering output")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses config file value, then RUST_LOG, then 'warn'
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/taxon/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Taxonomy database path (overrides config file and TAXON_DB_PATH)
    #[arg(long = "db", global = true)]
    pub db_path: Option<PathBuf>,

    /// Embedding service URL (overrides config file)
    #[arg(long, global = true)]
    pub embedding_url: Option<String>,

    /// Embedding model name (overrides config file)
    #[arg(long, global = true)]
    pub embedding_model: Option<String>,
}

impl Cli {
    /// Log level requested on the command line, if any.
    pub fn requested_log_level(&self) -> Option<LevelFilter> {
        if self.verbose {
            Some(LevelFilter::DEBUG)
        } else {
            self.log_level.map(Into::into)
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a taxonomy from a JSON record batch
    Build {
        /// Record file: a JSON array, or an object with a `nodes` array
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Write to a per-session database in the output directory
        #[arg(short, long, value_name = "ID")]
        session: Option<String>,

        /// Root class name (defaults to build.root_class)
        #[arg(short, long)]
        root: Option<String>,

        /// parent_index value meaning "no parent" (defaults to build.root_parent_sentinel)
        #[arg(long, allow_negative_numbers = true)]
        sentinel: Option<i64>,

        /// Store summaries only, skip the embedding service
        #[arg(long)]
        no_embeddings: bool,
    },

    /// Print the class hierarchy
    Tree {
        /// Maximum depth to print (root is depth 0)
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Show one class with its annotations
    Show {
        /// Class name
        name: String,
    },

    /// List classes, optionally only those carrying an annotation
    List {
        /// Only classes with a value for this annotation field
        #[arg(short, long, value_name = "FIELD")]
        annotation: Option<String>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Export the taxonomy as nested JSON
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave embedding vectors out of the export
        #[arg(long)]
        no_vectors: bool,
    },

    /// Show taxonomy and database statistics
    Stats {
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Delete stale per-session databases from the output directory
    Cleanup {
        /// Remove session databases older than this many hours
        #[arg(long, default_value = "24")]
        max_age_hours: u64,

        /// Only report what would be removed
        #[arg(long)]
        dry_run: bool,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize a new config file
    Init {
        /// Path for the config file (defaults to ~/.config/taxon/config.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite existing config file
        #[arg(short = 'F', long)]
        force: bool,
    },

    /// Show the current effective configuration
    Show {
        /// Output format (toml, json)
        #[arg(short = 'f', long, default_value = "toml")]
        format: String,
    },
}
