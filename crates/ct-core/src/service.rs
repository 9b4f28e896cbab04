//! Thread rendering service
//!
//! Ties the data-access collaborator to the tree builder and walker:
//! fetch a snapshot, build the tree, walk it for the viewer.

use crate::comment::{Comment, Commentable};
use crate::config::Config;
use crate::error::{CommentTreeError, Result};
use crate::pagination::{PaginationPolicy, RenderMode};
use crate::policy::ScorePolicy;
use crate::render::{RenderEligibilityWalker, RenderPlan};
use crate::tree::{CommentOrder, TreeBuilder};
use crate::types::{CommentId, CommentableRef};
use crate::viewer::ViewerContext;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Data-access collaborator supplying comment snapshots
pub trait CommentSource {
    /// All comments of a commentable, in no particular order
    fn fetch_comments(&self, commentable: &CommentableRef) -> Result<Vec<Comment>>;

    /// The commentable itself
    fn fetch_commentable(&self, commentable: &CommentableRef) -> Result<Commentable>;
}

impl<S: CommentSource + ?Sized> CommentSource for &S {
    fn fetch_comments(&self, commentable: &CommentableRef) -> Result<Vec<Comment>> {
        (**self).fetch_comments(commentable)
    }

    fn fetch_commentable(&self, commentable: &CommentableRef) -> Result<Commentable> {
        (**self).fetch_commentable(commentable)
    }
}

/// Everything a template needs to render one thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadView {
    pub commentable: CommentableRef,
    /// Comments in the snapshot, before any filtering
    pub total_comments: usize,
    pub mode: RenderMode,
    /// False when the viewer is missing some comments (hidden or negative)
    pub all_comments_visible: bool,
    /// Permalink target, if the request addressed a single comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink_root: Option<CommentId>,
    pub plan: RenderPlan,
}

/// Renders comment threads from a [`CommentSource`]
pub struct CommentThreadService<S> {
    source: S,
    walker: RenderEligibilityWalker,
    pagination: PaginationPolicy,
}

impl<S: CommentSource> CommentThreadService<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            walker: RenderEligibilityWalker::new(ScorePolicy::new(config.visibility)),
            pagination: PaginationPolicy::new(config.pagination),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn pagination(&self) -> &PaginationPolicy {
        &self.pagination
    }

    /// Render a commentable's whole thread.
    ///
    /// `limit` defaults per commentable kind and is capped at the configured
    /// maximum; an explicit zero is rejected.
    pub fn render_commentable(
        &self,
        commentable: &CommentableRef,
        viewer: &ViewerContext,
        limit: Option<usize>,
        order: CommentOrder,
    ) -> Result<ThreadView> {
        let owner = self.source.fetch_commentable(commentable)?;
        let comments = self.source.fetch_comments(commentable)?;
        let total = comments.len();
        let all_visible = all_comments_visible(&owner, &comments, viewer);

        let limit = self.pagination.limit_for(commentable.kind, limit);
        let tree = TreeBuilder::build(comments, limit, order)?;
        let plan = self.walker.walk(&tree, viewer, None);

        info!(
            "Rendered {} for {}: {} comments, {} shown",
            commentable,
            viewer,
            total,
            plan.rendered_count()
        );

        Ok(ThreadView {
            commentable: *commentable,
            total_comments: total,
            mode: self.pagination.render_mode(total),
            all_comments_visible: all_visible,
            permalink_root: None,
            plan,
        })
    }

    /// Render the subtree of a single comment opened by permalink.
    ///
    /// Fails with `CommentNotFound` when the comment does not exist or the
    /// viewer may not see it at all.
    pub fn render_permalink(
        &self,
        commentable: &CommentableRef,
        comment_id: CommentId,
        viewer: &ViewerContext,
    ) -> Result<ThreadView> {
        let owner = self.source.fetch_commentable(commentable)?;
        let comments = self.source.fetch_comments(commentable)?;
        let total = comments.len();
        let all_visible = all_comments_visible(&owner, &comments, viewer);

        let tree = TreeBuilder::build_subtree(comments, comment_id, CommentOrder::Oldest)?;
        let plan = self.walker.walk(&tree, viewer, Some(&comment_id));

        if !plan.find(&comment_id).is_some_and(|node| node.is_rendered()) {
            debug!("Comment {} is not visible to {}", comment_id, viewer);
            return Err(CommentTreeError::CommentNotFound(comment_id.to_string()));
        }

        Ok(ThreadView {
            commentable: *commentable,
            total_comments: total,
            mode: self.pagination.render_mode(total),
            all_comments_visible: all_visible,
            permalink_root: Some(comment_id),
            plan,
        })
    }

    /// Whether any comment of the commentable has a negative score
    pub fn any_negative_comments(&self, commentable: &CommentableRef) -> Result<bool> {
        let comments = self.source.fetch_comments(commentable)?;
        Ok(any_negative_comments(&comments))
    }

    /// Whether negative comments exist that the viewer cannot see
    pub fn any_hidden_negative_comments(
        &self,
        commentable: &CommentableRef,
        viewer: &ViewerContext,
    ) -> Result<bool> {
        Ok(!viewer.is_signed_in() && self.any_negative_comments(commentable)?)
    }
}

fn any_negative_comments(comments: &[Comment]) -> bool {
    comments.iter().any(|comment| comment.score < 0)
}

/// Whether the viewer sees every comment (nothing author-hidden, nothing
/// negative withheld from an anonymous viewer)
pub fn all_comments_visible(
    commentable: &Commentable,
    comments: &[Comment],
    viewer: &ViewerContext,
) -> bool {
    let hidden_negative = !viewer.is_signed_in() && any_negative_comments(comments);
    !(commentable.any_comments_hidden || hidden_negative)
}

/// CSS class of a comment in the thread
pub fn comment_class(comment: &Comment, is_view_root: bool) -> &'static str {
    if comment.is_root() || is_view_root {
        "root"
    } else {
        "child"
    }
}

/// Whether the comment was written by the commentable's author or a co-author
pub fn commentable_author_is_op(commentable: &Commentable, comment: &Comment) -> bool {
    commentable.is_author(&comment.user_id)
}

/// Negative comments and comments on negative commentables are not indexed
pub fn should_noindex(comment: &Comment, commentable: &Commentable) -> bool {
    comment.score < 0 || commentable.score < 0
}
