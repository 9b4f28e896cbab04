//! ct-core - Core library for comment-tree
//!
//! This crate decides how a commentable's comment thread is rendered:
//! it builds a bounded, ordered comment forest from a snapshot and walks it
//! to compute a per-comment disposition for the current viewer.

pub mod error;
pub mod types;
pub mod config;
pub mod comment;
pub mod viewer;
pub mod policy;
pub mod tree;
pub mod render;
pub mod pagination;
pub mod service;
pub mod snapshot;

pub use error::{CommentTreeError, Result};
pub use types::*;
