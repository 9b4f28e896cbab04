//! Comment data models

use crate::types::{CommentId, CommentableRef, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment as read from the data-access layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique comment identifier
    pub id: CommentId,
    /// Parent comment; `None` for a root comment
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    /// Article or podcast episode the comment belongs to
    pub commentable: CommentableRef,
    /// Author of the comment
    pub user_id: UserId,
    /// Community score (reactions and moderation)
    #[serde(default)]
    pub score: i64,
    /// Hidden by the commentable's author or a co-author
    #[serde(default)]
    pub hidden_by_commentable_user: bool,
    /// Soft-deleted
    #[serde(default)]
    pub deleted: bool,
    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Whether this comment starts a thread
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Author id as exposed to templates; deleted comments have no author
    pub fn user_id_unless_deleted(&self) -> u64 {
        if self.deleted {
            0
        } else {
            self.user_id.0
        }
    }
}

/// An entity owning a comment thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commentable {
    /// Type and id
    #[serde(flatten)]
    pub reference: CommentableRef,
    /// Author of the article or episode
    pub user_id: UserId,
    /// Co-authors allowed to moderate the thread
    #[serde(default)]
    pub co_author_ids: Vec<UserId>,
    /// Cached flag: some comment in the thread is hidden by the author
    #[serde(default)]
    pub any_comments_hidden: bool,
    /// Score of the commentable itself
    #[serde(default)]
    pub score: i64,
}

impl Commentable {
    /// Create a commentable with no co-authors
    pub fn new(reference: CommentableRef, user_id: UserId) -> Self {
        Self {
            reference,
            user_id,
            co_author_ids: Vec::new(),
            any_comments_hidden: false,
            score: 0,
        }
    }

    /// Author plus co-authors
    pub fn author_ids(&self) -> impl Iterator<Item = &UserId> {
        std::iter::once(&self.user_id).chain(self.co_author_ids.iter())
    }

    /// Whether the user wrote (or co-wrote) the commentable
    pub fn is_author(&self, user_id: &UserId) -> bool {
        self.author_ids().any(|id| id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::CommentBuilder;

    #[test]
    fn test_is_root() {
        let root = CommentBuilder::new(1, CommentableRef::article(1)).build().unwrap();
        let child = CommentBuilder::new(2, CommentableRef::article(1))
            .parent(1)
            .build()
            .unwrap();
        assert!(root.is_root());
        assert!(!child.is_root());
    }

    #[test]
    fn test_user_id_unless_deleted() {
        let comment = CommentBuilder::new(1, CommentableRef::article(1))
            .user(42)
            .build()
            .unwrap();
        assert_eq!(comment.user_id_unless_deleted(), 42);

        let deleted = CommentBuilder::new(2, CommentableRef::article(1))
            .user(42)
            .deleted()
            .build()
            .unwrap();
        assert_eq!(deleted.user_id_unless_deleted(), 0);
    }

    #[test]
    fn test_commentable_authors() {
        let mut article = Commentable::new(CommentableRef::article(5), UserId(1));
        article.co_author_ids = vec![UserId(2), UserId(3)];

        assert!(article.is_author(&UserId(1)));
        assert!(article.is_author(&UserId(3)));
        assert!(!article.is_author(&UserId(4)));
        assert_eq!(article.author_ids().count(), 3);
    }

    #[test]
    fn test_comment_deserialize_defaults() {
        let json = r#"{
            "id": 3,
            "commentable": {"kind": "article", "id": 1},
            "user_id": 9,
            "created_at": "2024-01-01T00:00:00Z"
        }"#;
        let comment: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.score, 0);
        assert!(comment.parent_id.is_none());
        assert!(!comment.hidden_by_commentable_user);
        assert!(!comment.deleted);
    }

    #[test]
    fn test_commentable_serialization_is_flat() {
        let article = Commentable::new(CommentableRef::article(5), UserId(1));
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["kind"], "article");
        assert_eq!(json["id"], 5);
        assert_eq!(json["user_id"], 1);
    }
}
