//! Render eligibility
//!
//! Walks a [`CommentTree`] and decides, per comment, whether it is rendered
//! in full, replaced by a placeholder, or omitted. The walk is post-order
//! over an explicit stack: a node's disposition may depend on whether any
//! of its children survived, so children are decided first.

use crate::comment::Comment;
use crate::policy::{Classification, ScorePolicy};
use crate::tree::{CommentNode, CommentTree};
use crate::types::CommentId;
use crate::viewer::ViewerContext;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a single comment is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Full comment body
    Full,
    /// "Comment deleted" stand-in keeping the thread connected
    DeletedPlaceholder,
    /// "Comment hidden by post author" stand-in
    HiddenPlaceholder,
    /// Not rendered at all
    Omit,
}

impl Disposition {
    pub fn is_rendered(&self) -> bool {
        !matches!(self, Disposition::Omit)
    }
}

/// Render decision for one comment and its replies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanNode {
    pub comment_id: CommentId,
    pub disposition: Disposition,
    /// Rendered with the low quality marker
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub low_quality: bool,
    /// No reply survived filtering
    pub childless: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    pub fn is_rendered(&self) -> bool {
        self.disposition.is_rendered()
    }

    /// Mark a node and its whole subtree as omitted
    fn omitted(root: &CommentNode) -> Self {
        let mut ancestors: Vec<(&CommentNode, Vec<PlanNode>)> = Vec::new();
        let mut current = (root, Vec::with_capacity(root.children.len()));

        loop {
            let node = current.0;
            if let Some(child) = node.children.get(current.1.len()) {
                let frame = (child, Vec::with_capacity(child.children.len()));
                ancestors.push(std::mem::replace(&mut current, frame));
                continue;
            }

            let (node, children) = current;
            let plan = Self {
                comment_id: node.comment.id,
                disposition: Disposition::Omit,
                low_quality: false,
                childless: true,
                children,
            };
            match ancestors.pop() {
                Some((parent, mut siblings)) => {
                    siblings.push(plan);
                    current = (parent, siblings);
                }
                None => return plan,
            }
        }
    }
}

impl Drop for PlanNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Ordered render decisions mirroring the shape of the walked tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub nodes: Vec<PlanNode>,
}

impl RenderPlan {
    /// Pre-order traversal over every node, omitted ones included
    pub fn iter(&self) -> impl Iterator<Item = &PlanNode> {
        let mut stack: Vec<&PlanNode> = self.nodes.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    pub fn find(&self, id: &CommentId) -> Option<&PlanNode> {
        self.iter().find(|node| &node.comment_id == id)
    }

    pub fn disposition_of(&self, id: &CommentId) -> Option<Disposition> {
        self.find(id).map(|node| node.disposition)
    }

    /// Number of nodes that produce output
    pub fn rendered_count(&self) -> usize {
        self.iter().filter(|node| node.is_rendered()).count()
    }

    /// Whether nothing at all would be rendered
    pub fn is_empty(&self) -> bool {
        self.rendered_count() == 0
    }
}

/// Per-walk state shared by every node
struct WalkContext<'a> {
    viewer: &'a ViewerContext,
    permalink_root: Option<CommentId>,
}

/// A node whose children are still being decided
struct WalkFrame<'t> {
    node: &'t CommentNode,
    class: Classification,
    depth: usize,
    reveal_hidden: bool,
    children: Vec<PlanNode>,
}

/// Outcome of entering a node
enum Visit<'t> {
    Descend(WalkFrame<'t>),
    Decided(PlanNode),
}

/// Applies the score policy and thread rules to a comment tree
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderEligibilityWalker {
    policy: ScorePolicy,
}

impl RenderEligibilityWalker {
    pub fn new(policy: ScorePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScorePolicy {
        &self.policy
    }

    /// Compute the render plan for `tree` as seen by `viewer`.
    ///
    /// `permalink_root` is the comment addressed directly by the request, if
    /// any; `None` means the commentable's whole thread is being rendered.
    pub fn walk(
        &self,
        tree: &CommentTree,
        viewer: &ViewerContext,
        permalink_root: Option<&CommentId>,
    ) -> RenderPlan {
        let ctx = WalkContext {
            viewer,
            permalink_root: permalink_root.copied(),
        };

        let plan = RenderPlan {
            nodes: tree
                .roots()
                .iter()
                .map(|node| self.walk_root(node, &ctx))
                .collect(),
        };

        debug!(
            "Walked comment tree for {}: {} of {} comments rendered",
            viewer,
            plan.rendered_count(),
            tree.len()
        );
        plan
    }

    fn walk_root(&self, root: &CommentNode, ctx: &WalkContext<'_>) -> PlanNode {
        let mut ancestors: Vec<WalkFrame<'_>> = Vec::new();
        let mut current = match self.enter(root, ctx, 0, false) {
            Visit::Descend(frame) => frame,
            Visit::Decided(plan) => return plan,
        };

        loop {
            let node = current.node;
            if let Some(child) = node.children.get(current.children.len()) {
                match self.enter(child, ctx, current.depth + 1, current.reveal_hidden) {
                    Visit::Descend(frame) => ancestors.push(std::mem::replace(&mut current, frame)),
                    Visit::Decided(plan) => current.children.push(plan),
                }
                continue;
            }

            let plan = self.finish(current, ctx);
            match ancestors.pop() {
                Some(mut parent) => {
                    parent.children.push(plan);
                    current = parent;
                }
                None => return plan,
            }
        }
    }

    fn enter<'t>(
        &self,
        node: &'t CommentNode,
        ctx: &WalkContext<'_>,
        depth: usize,
        reveal_hidden: bool,
    ) -> Visit<'t> {
        let comment = &node.comment;
        let class = self.policy.classify(comment, ctx.viewer);

        // Anonymous viewers lose suppressed comments with everything below them
        if !comment.deleted && class == Classification::Suppressed && !ctx.viewer.is_signed_in() {
            return Visit::Decided(PlanNode::omitted(node));
        }

        // Opening a hidden comment's permalink reveals it and its replies
        let reveal_hidden = reveal_hidden
            || (ctx.permalink_root == Some(comment.id) && comment.hidden_by_commentable_user);

        Visit::Descend(WalkFrame {
            node,
            class,
            depth,
            reveal_hidden,
            children: Vec::with_capacity(node.children.len()),
        })
    }

    fn finish(&self, frame: WalkFrame<'_>, ctx: &WalkContext<'_>) -> PlanNode {
        let comment = &frame.node.comment;
        let childless = !frame.children.iter().any(PlanNode::is_rendered);
        let disposition =
            self.disposition(comment, frame.class, ctx, frame.depth, childless, frame.reveal_hidden);

        PlanNode {
            comment_id: comment.id,
            disposition,
            low_quality: disposition == Disposition::Full && frame.class == Classification::LowQuality,
            childless,
            children: frame.children,
        }
    }

    fn disposition(
        &self,
        comment: &Comment,
        class: Classification,
        ctx: &WalkContext<'_>,
        depth: usize,
        childless: bool,
        reveal_hidden: bool,
    ) -> Disposition {
        if comment.deleted {
            return Disposition::DeletedPlaceholder;
        }

        match class {
            Classification::Suppressed if childless => return Disposition::Omit,
            Classification::Suppressed => return Disposition::DeletedPlaceholder,
            Classification::LowQuality
                if childless
                    && depth == 0
                    && ctx.permalink_root.is_none()
                    && !ctx.viewer.is_moderator() =>
            {
                return Disposition::Omit;
            }
            _ => {}
        }

        if comment.hidden_by_commentable_user && !reveal_hidden {
            Disposition::HiddenPlaceholder
        } else {
            Disposition::Full
        }
    }
}
