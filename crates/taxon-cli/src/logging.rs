//! Tracing subscriber setup
//!
//! Level precedence: `--verbose` / `--log-level`, then `[logging] level`
//! (which `TAXON_LOG_LEVEL` already overrides), then `RUST_LOG`, then warn.
//! Logs go to stderr so JSON on stdout stays parseable.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

pub fn build_filter(cli_level: Option<LevelFilter>, config_level: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::default().add_directive(level.into());
    }
    if let Some(directives) = config_level {
        match EnvFilter::try_new(directives) {
            Ok(filter) => return filter,
            Err(e) => eprintln!("Ignoring invalid log level '{}': {}", directives, e),
        }
    }
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::WARN.into()))
}

pub fn init(cli_level: Option<LevelFilter>, config_level: Option<&str>) {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(cli_level, config_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
