//! Comment builder for fluent API

use super::model::Comment;
use crate::error::{CommentTreeError, Result};
use crate::types::{CommentId, CommentableRef, UserId};
use chrono::{DateTime, Utc};

/// Builder for creating comment snapshots with fluent API
pub struct CommentBuilder {
    id: CommentId,
    commentable: CommentableRef,
    parent_id: Option<CommentId>,
    user_id: UserId,
    score: i64,
    hidden_by_commentable_user: bool,
    deleted: bool,
    created_at: Option<DateTime<Utc>>,
}

impl CommentBuilder {
    /// Create a new builder for a root comment
    pub fn new(id: u64, commentable: CommentableRef) -> Self {
        Self {
            id: CommentId(id),
            commentable,
            parent_id: None,
            user_id: UserId(0),
            score: 0,
            hidden_by_commentable_user: false,
            deleted: false,
            created_at: None,
        }
    }

    /// Set the parent comment
    pub fn parent(mut self, parent_id: u64) -> Self {
        self.parent_id = Some(CommentId(parent_id));
        self
    }

    /// Set the author
    pub fn user(mut self, user_id: u64) -> Self {
        self.user_id = UserId(user_id);
        self
    }

    /// Set the score
    pub fn score(mut self, score: i64) -> Self {
        self.score = score;
        self
    }

    /// Mark as hidden by the commentable's author
    pub fn hidden(mut self) -> Self {
        self.hidden_by_commentable_user = true;
        self
    }

    /// Mark as soft-deleted
    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    /// Set the creation time
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Build the comment
    pub fn build(self) -> Result<Comment> {
        if self.parent_id == Some(self.id) {
            return Err(CommentTreeError::InvalidArgument(format!(
                "Comment {} cannot be its own parent",
                self.id
            )));
        }

        Ok(Comment {
            id: self.id,
            parent_id: self.parent_id,
            commentable: self.commentable,
            user_id: self.user_id,
            score: self.score,
            hidden_by_commentable_user: self.hidden_by_commentable_user,
            deleted: self.deleted,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_basic_builder() {
        let comment = CommentBuilder::new(1, CommentableRef::article(10))
            .build()
            .unwrap();

        assert_eq!(comment.id, CommentId(1));
        assert_eq!(comment.score, 0);
        assert!(comment.is_root());
        assert!(!comment.deleted);
    }

    #[test]
    fn test_builder_with_flags() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let comment = CommentBuilder::new(2, CommentableRef::podcast_episode(4))
            .parent(1)
            .user(7)
            .score(-80)
            .hidden()
            .deleted()
            .created_at(ts)
            .build()
            .unwrap();

        assert_eq!(comment.parent_id, Some(CommentId(1)));
        assert_eq!(comment.user_id, UserId(7));
        assert_eq!(comment.score, -80);
        assert!(comment.hidden_by_commentable_user);
        assert!(comment.deleted);
        assert_eq!(comment.created_at, ts);
    }

    #[test]
    fn test_builder_rejects_self_parent() {
        let result = CommentBuilder::new(3, CommentableRef::article(1))
            .parent(3)
            .build();

        assert!(matches!(result, Err(CommentTreeError::InvalidArgument(_))));
    }
}
