//! Comment data module
//!
//! Comment and commentable snapshots as read from the data-access layer.

pub mod model;
pub mod builder;

pub use model::*;
pub use builder::CommentBuilder;
