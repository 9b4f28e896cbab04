//! Config command
//!
//! Manage comment-tree configuration.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use ct_core::config::Config;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show effective configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the default configuration
    Init {
        /// Overwrite without confirmation
        #[arg(long)]
        force: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Print the configuration file path
    Path,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, path: Option<&Path>) -> Result<()> {
    let config_path = get_config_path(path);
    match cmd {
        ConfigCommand::Show { json } => show_config(path, json),
        ConfigCommand::Init { force } => init_config(&config_path, force),
        ConfigCommand::Validate => validate_config(&config_path),
        ConfigCommand::Path => {
            println!("{}", config_path.display());
            Ok(())
        }
    }
}

fn get_config_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf).unwrap_or_else(Config::default_path)
}

fn show_config(path: Option<&Path>, as_json: bool) -> Result<()> {
    let config = super::load_config(path)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("{}", "Configuration:".bold().underline());
        println!("{}", get_config_path(path).display().to_string().dimmed());
        println!();
        println!("{}", config.to_toml()?);
    }

    Ok(())
}

fn init_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt("Overwrite existing configuration with defaults?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Init cancelled.");
            return Ok(());
        }
    }

    // Backup existing
    if config_path.exists() {
        let backup_path = format!(
            "{}.backup-{}",
            config_path.display(),
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        fs::copy(config_path, &backup_path)?;
        println!("{} Backed up to {}", "✓".green(), backup_path);
    }

    Config::default()
        .save(config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!(
        "{} Wrote default configuration to {}",
        "✓".green(),
        config_path.display()
    );
    Ok(())
}

fn validate_config(config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        eprintln!(
            "{} Configuration not found at {}",
            "✗".red(),
            config_path.display()
        );
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(_) => println!("{} Configuration is valid", "✓".green()),
        Err(e) => eprintln!("{} Invalid configuration: {}", "✗".red(), e),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_config_path() {
        let path = get_config_path(None);
        assert!(path.ends_with("config.toml"));

        let explicit = get_config_path(Some(Path::new("custom.toml")));
        assert_eq!(explicit, PathBuf::from("custom.toml"));
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        init_config(&path, true).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }
}
