//! Thread size thresholds

use crate::config::PaginationConfig;
use crate::types::CommentableKind;
use serde::{Deserialize, Serialize};

/// Name of the view that lists every comment of a commentable
pub const FULL_COMMENTS_VIEW: &str = "comments";

/// How much of a thread the caller should render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Whole thread fits inline
    InlineSummary,
    /// Render a truncated thread with a "view all N comments" link
    FullThread,
}

/// Decides between inline and truncated rendering
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginationPolicy {
    config: PaginationConfig,
}

impl PaginationPolicy {
    pub fn new(config: PaginationConfig) -> Self {
        Self { config }
    }

    pub fn render_mode(&self, total_comment_count: usize) -> RenderMode {
        if self.view_all_comments(total_comment_count) {
            RenderMode::FullThread
        } else {
            RenderMode::InlineSummary
        }
    }

    /// More comments than a single pass may render
    pub fn high_number_of_comments(&self, count: usize) -> bool {
        count > self.config.max_comments
    }

    /// Whether the caller should offer a "view all comments" link
    pub fn view_all_comments(&self, count: usize) -> bool {
        count > self.config.min_comments
    }

    /// Root limit for the named view
    pub fn comment_count(&self, view: &str) -> usize {
        if view == FULL_COMMENTS_VIEW {
            self.config.max_comments
        } else {
            self.config.min_comments
        }
    }

    /// Root limit for a commentable-wide render, capped at the pass maximum
    pub fn limit_for(&self, kind: CommentableKind, requested: Option<usize>) -> usize {
        let default = match kind {
            CommentableKind::Article => self.config.max_comments,
            CommentableKind::PodcastEpisode => self.config.podcast_limit,
        };
        requested.unwrap_or(default).min(self.config.max_comments)
    }

    pub fn max_comments(&self) -> usize {
        self.config.max_comments
    }

    pub fn min_comments(&self) -> usize {
        self.config.min_comments
    }
}
