//! Command-line interface for pod-minder.
//!
//! No subcommand runs the long-lived scheduling service. The subcommands are
//! one-shot operations for operators and external schedulers.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pod Minder CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "POD_MINDER_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a single archive pass over all feeds, then exit
    Once,
    /// Validate the configuration and print the effective settings
    CheckConfig,
}
