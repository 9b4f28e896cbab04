//! Snapshot command
//!
//! Import, list and delete stored thread snapshots.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use ct_core::types::CommentableRef;
use ct_storage::{read_snapshot, FileSystemStore};

/// Snapshot subcommands
#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// Copy a snapshot file into the store
    Import {
        /// Snapshot file to import
        file: PathBuf,

        /// Snapshot store directory
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// List stored snapshots
    List {
        /// Snapshot store directory
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Delete a stored snapshot
    Delete {
        /// Commentable to delete (e.g. article-1)
        commentable: CommentableRef,

        /// Snapshot store directory
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

/// Execute the snapshot command
pub fn execute(cmd: SnapshotCommand) -> Result<()> {
    match cmd {
        SnapshotCommand::Import { file, store } => import(&file, open_store(store.as_deref())?),
        SnapshotCommand::List { store } => list(open_store(store.as_deref())?),
        SnapshotCommand::Delete { commentable, store } => {
            delete(&commentable, open_store(store.as_deref())?)
        }
    }
}

fn open_store(dir: Option<&Path>) -> Result<FileSystemStore> {
    let store = match dir {
        Some(dir) => FileSystemStore::new(dir),
        None => FileSystemStore::default_location(),
    };
    store.context("Failed to open snapshot store")
}

fn import(file: &Path, store: FileSystemStore) -> Result<()> {
    let snapshot = read_snapshot(file)
        .with_context(|| format!("Failed to read snapshot {}", file.display()))?;
    store.save(&snapshot)?;

    println!(
        "{} Imported {} ({} comments)",
        "✓".green(),
        snapshot.reference().to_string().cyan(),
        snapshot.comments.len()
    );
    Ok(())
}

fn list(store: FileSystemStore) -> Result<()> {
    let snapshots = store.list()?;

    if snapshots.is_empty() {
        println!(
            "No snapshots in {}",
            store.snapshots_dir().display().to_string().dimmed()
        );
        return Ok(());
    }

    println!("{}", "Stored snapshots:".bold().underline());
    for (reference, count) in snapshots {
        println!("  {} - {} comments", reference.to_string().cyan(), count);
    }
    Ok(())
}

fn delete(commentable: &CommentableRef, store: FileSystemStore) -> Result<()> {
    store
        .delete(commentable)
        .with_context(|| format!("Failed to delete snapshot {}", commentable))?;
    println!("{} Deleted {}", "✓".green(), commentable);
    Ok(())
}
