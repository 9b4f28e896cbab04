//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod config;
pub mod render;
pub mod snapshot;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ct_core::config::Config;
use std::path::{Path, PathBuf};

/// comment-tree - comment visibility and thread rendering inspector
#[derive(Debug, Parser)]
#[command(name = "comment-tree")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "COMMENT_TREE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render a comment thread for a viewer
    Render(render::RenderArgs),

    /// Manage stored thread snapshots
    #[command(subcommand)]
    Snapshot(snapshot::SnapshotCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Run the CLI application
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    // Handle color output
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config_path = cli.config.as_deref();

    // Dispatch to command handler
    match cli.command {
        Commands::Render(args) => render::execute(args, &load_config(config_path)?),
        Commands::Snapshot(cmd) => snapshot::execute(cmd),
        Commands::Config(cmd) => config::execute(cmd, config_path),
    }
}

/// Load configuration from the given path or the default location
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    Config::load_or_default(path).with_context(|| match path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
