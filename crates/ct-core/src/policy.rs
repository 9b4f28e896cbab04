//! Score policy: maps a comment's score to a visibility class

use crate::comment::Comment;
use crate::config::VisibilityConfig;
use crate::viewer::ViewerContext;
use serde::{Deserialize, Serialize};

/// Visibility class of a single comment, before thread context is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Shown normally
    Visible,
    /// Shown with a low quality marker
    LowQuality,
    /// Not shown (at most as a "deleted" stand-in)
    Suppressed,
}

/// Classifies comments against configured score thresholds
#[derive(Debug, Clone, Copy, Default)]
pub struct ScorePolicy {
    thresholds: VisibilityConfig,
}

impl ScorePolicy {
    pub fn new(thresholds: VisibilityConfig) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &VisibilityConfig {
        &self.thresholds
    }

    /// Classify a comment for the given viewer.
    ///
    /// Anonymous viewers see no negative scores at all. Moderators are never
    /// shown a suppressed classification; anything under the low quality
    /// threshold is surfaced to them with the marker instead.
    pub fn classify(&self, comment: &Comment, viewer: &ViewerContext) -> Classification {
        let score = comment.score;

        if !viewer.is_signed_in() {
            return if score < 0 {
                Classification::Suppressed
            } else {
                Classification::Visible
            };
        }

        if score < self.thresholds.suppression_threshold && !viewer.is_moderator() {
            Classification::Suppressed
        } else if score < self.thresholds.low_quality_threshold {
            Classification::LowQuality
        } else {
            Classification::Visible
        }
    }

    /// Whether the score is in the spam tier regardless of viewer
    pub fn is_super_low_quality(&self, comment: &Comment) -> bool {
        comment.score < self.thresholds.suppression_threshold
    }

    /// Whether the score carries the low quality marker regardless of viewer
    pub fn is_low_quality(&self, comment: &Comment) -> bool {
        comment.score < self.thresholds.low_quality_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::CommentBuilder;
    use crate::types::CommentableRef;
    use crate::viewer::Role;

    fn comment_with_score(score: i64) -> Comment {
        CommentBuilder::new(1, CommentableRef::article(1))
            .score(score)
            .build()
            .unwrap()
    }

    #[test]
    fn test_signed_in_classification() {
        let policy = ScorePolicy::default();
        let viewer = ViewerContext::user(1);

        assert_eq!(policy.classify(&comment_with_score(10), &viewer), Classification::Visible);
        assert_eq!(policy.classify(&comment_with_score(-50), &viewer), Classification::Visible);
        assert_eq!(policy.classify(&comment_with_score(-75), &viewer), Classification::Visible);
        assert_eq!(policy.classify(&comment_with_score(-76), &viewer), Classification::LowQuality);
        assert_eq!(policy.classify(&comment_with_score(-400), &viewer), Classification::LowQuality);
        assert_eq!(policy.classify(&comment_with_score(-401), &viewer), Classification::Suppressed);
        assert_eq!(policy.classify(&comment_with_score(-1000), &viewer), Classification::Suppressed);
    }

    #[test]
    fn test_anonymous_sees_no_negative_scores() {
        let policy = ScorePolicy::default();
        let viewer = ViewerContext::Anonymous;

        assert_eq!(policy.classify(&comment_with_score(0), &viewer), Classification::Visible);
        assert_eq!(policy.classify(&comment_with_score(-1), &viewer), Classification::Suppressed);
        assert_eq!(policy.classify(&comment_with_score(-100), &viewer), Classification::Suppressed);
    }

    #[test]
    fn test_moderator_never_suppressed() {
        let policy = ScorePolicy::default();
        let admin = ViewerContext::with_roles(1, [Role::Admin]);

        assert_eq!(policy.classify(&comment_with_score(-1000), &admin), Classification::LowQuality);
        assert_eq!(policy.classify(&comment_with_score(-100), &admin), Classification::LowQuality);
        assert_eq!(policy.classify(&comment_with_score(3), &admin), Classification::Visible);
    }

    #[test]
    fn test_configured_thresholds() {
        let policy = ScorePolicy::new(VisibilityConfig {
            suppression_threshold: -100,
            low_quality_threshold: -25,
        });
        let viewer = ViewerContext::user(1);

        assert_eq!(policy.classify(&comment_with_score(-50), &viewer), Classification::LowQuality);
        assert_eq!(policy.classify(&comment_with_score(-150), &viewer), Classification::Suppressed);
        assert!(policy.is_low_quality(&comment_with_score(-50)));
        assert!(!policy.is_super_low_quality(&comment_with_score(-50)));
    }
}
