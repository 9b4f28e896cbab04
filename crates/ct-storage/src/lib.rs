//! ct-storage - Storage library for comment-tree
//!
//! This crate stores thread snapshots on disk and serves them as a
//! comment source.

mod snapshot_store;

pub use snapshot_store::{read_snapshot, FileSystemStore};
