//! Thread snapshot file format

use crate::comment::{Comment, Commentable};
use crate::error::{CommentTreeError, Result};
use crate::service::CommentSource;
use crate::types::CommentableRef;
use serde::{Deserialize, Serialize};

/// Current snapshot schema version
pub const CURRENT_SCHEMA_VERSION: &str = "1.0";

/// A commentable and all of its comments, as fetched at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub commentable: Commentable,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

fn default_schema_version() -> String {
    CURRENT_SCHEMA_VERSION.to_string()
}

impl ThreadSnapshot {
    pub fn new(commentable: Commentable, comments: Vec<Comment>) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            commentable,
            comments,
        }
    }

    pub fn reference(&self) -> CommentableRef {
        self.commentable.reference
    }

    /// Check schema version and that every comment belongs here
    pub fn validate(&self) -> Result<()> {
        let major = self.schema_version.split('.').next().unwrap_or_default();
        let current_major = CURRENT_SCHEMA_VERSION.split('.').next().unwrap_or_default();
        if major != current_major {
            return Err(CommentTreeError::UnsupportedSchemaVersion(
                self.schema_version.clone(),
            ));
        }

        if let Some(stray) = self
            .comments
            .iter()
            .find(|c| c.commentable != self.commentable.reference)
        {
            return Err(CommentTreeError::InvalidArgument(format!(
                "Comment {} belongs to {}, not {}",
                stray.id, stray.commentable, self.commentable.reference
            )));
        }

        Ok(())
    }

    /// Parse and validate a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: ThreadSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

impl CommentSource for ThreadSnapshot {
    fn fetch_comments(&self, commentable: &CommentableRef) -> Result<Vec<Comment>> {
        if commentable != &self.commentable.reference {
            return Err(CommentTreeError::CommentableNotFound(commentable.to_string()));
        }
        Ok(self.comments.clone())
    }

    fn fetch_commentable(&self, commentable: &CommentableRef) -> Result<Commentable> {
        if commentable != &self.commentable.reference {
            return Err(CommentTreeError::CommentableNotFound(commentable.to_string()));
        }
        Ok(self.commentable.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::CommentBuilder;
    use crate::types::UserId;

    fn snapshot() -> ThreadSnapshot {
        let article = CommentableRef::article(1);
        ThreadSnapshot::new(
            Commentable::new(article, UserId(1)),
            vec![CommentBuilder::new(1, article).build().unwrap()],
        )
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "commentable": {"kind": "article", "id": 1, "user_id": 3},
            "comments": [
                {"id": 1, "commentable": {"kind": "article", "id": 1}, "user_id": 4,
                 "score": -10, "created_at": "2024-01-01T00:00:00Z"},
                {"id": 2, "parent_id": 1, "commentable": {"kind": "article", "id": 1},
                 "user_id": 5, "created_at": "2024-01-01T00:05:00Z"}
            ]
        }"#;
        let snapshot = ThreadSnapshot::from_json(json).unwrap();

        assert_eq!(snapshot.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(snapshot.comments.len(), 2);
        assert_eq!(snapshot.reference(), CommentableRef::article(1));
    }

    #[test]
    fn test_rejects_future_schema() {
        let mut snapshot = snapshot();
        snapshot.schema_version = "2.0".to_string();
        assert!(matches!(
            snapshot.validate(),
            Err(CommentTreeError::UnsupportedSchemaVersion(_))
        ));

        snapshot.schema_version = "1.3".to_string();
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_rejects_stray_comment() {
        let mut snapshot = snapshot();
        snapshot.comments.push(
            CommentBuilder::new(2, CommentableRef::podcast_episode(1))
                .build()
                .unwrap(),
        );
        assert!(matches!(
            snapshot.validate(),
            Err(CommentTreeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_snapshot_as_source() {
        let snapshot = snapshot();
        assert_eq!(
            snapshot
                .fetch_comments(&CommentableRef::article(1))
                .unwrap()
                .len(),
            1
        );
        assert!(matches!(
            snapshot.fetch_commentable(&CommentableRef::article(2)),
            Err(CommentTreeError::CommentableNotFound(_))
        ));
    }
}
