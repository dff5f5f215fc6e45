//! Taxon CLI library
//!
//! Argument parsing, configuration precedence and the subcommands behind
//! the `taxon` binary. Kept as a library so integration tests can reach the
//! rendering helpers directly.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod output;
