//! Core type definitions for comment-tree

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CommentId {
    type Err = crate::CommentTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(CommentId).map_err(|_| {
            crate::CommentTreeError::InvalidArgument(format!("Invalid comment ID: {}", s))
        })
    }
}

impl From<u64> for CommentId {
    fn from(id: u64) -> Self {
        CommentId(id)
    }
}

/// Unique identifier for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        UserId(id)
    }
}

/// Kind of entity that owns a comment thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentableKind {
    Article,
    PodcastEpisode,
}

impl CommentableKind {
    /// Short name used in file names and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentableKind::Article => "article",
            CommentableKind::PodcastEpisode => "podcast_episode",
        }
    }
}

impl fmt::Display for CommentableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentableKind {
    type Err = crate::CommentTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" | "Article" => Ok(CommentableKind::Article),
            "podcast_episode" | "PodcastEpisode" => Ok(CommentableKind::PodcastEpisode),
            other => Err(crate::CommentTreeError::InvalidArgument(format!(
                "Unknown commentable type: {}",
                other
            ))),
        }
    }
}

/// Polymorphic reference to a commentable (type + id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentableRef {
    pub kind: CommentableKind,
    pub id: u64,
}

impl CommentableRef {
    /// Reference an article
    pub fn article(id: u64) -> Self {
        Self {
            kind: CommentableKind::Article,
            id,
        }
    }

    /// Reference a podcast episode
    pub fn podcast_episode(id: u64) -> Self {
        Self {
            kind: CommentableKind::PodcastEpisode,
            id,
        }
    }
}

impl fmt::Display for CommentableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.id)
    }
}

/// Parses the `<kind>-<id>` form produced by `Display`
impl FromStr for CommentableRef {
    type Err = crate::CommentTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s.rsplit_once(|c: char| c == '-' || c == ':').ok_or_else(|| {
            crate::CommentTreeError::InvalidArgument(format!(
                "Invalid commentable '{}', expected <kind>-<id>",
                s
            ))
        })?;
        let id = id.parse::<u64>().map_err(|_| {
            crate::CommentTreeError::InvalidArgument(format!("Invalid commentable id in '{}'", s))
        })?;
        Ok(CommentableRef {
            kind: kind.parse()?,
            id,
        })
    }
}
