//! Comment tree construction
//!
//! Turns a flat comment snapshot into an ordered forest. Ordering applies
//! among siblings at every level; the limit bounds the number of roots only.

use crate::comment::Comment;
use crate::error::{CommentTreeError, Result};
use crate::types::CommentId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Sibling ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentOrder {
    /// Highest score first
    #[default]
    Top,
    /// Oldest first
    Oldest,
    /// Newest first
    Latest,
}

impl CommentOrder {
    /// Total order between two siblings; ties fall back to creation time and id
    pub fn compare(&self, a: &Comment, b: &Comment) -> Ordering {
        match self {
            CommentOrder::Top => b
                .score
                .cmp(&a.score)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id)),
            CommentOrder::Oldest => a
                .created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id)),
            CommentOrder::Latest => b
                .created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommentOrder::Top => "top",
            CommentOrder::Oldest => "oldest",
            CommentOrder::Latest => "latest",
        }
    }
}

impl fmt::Display for CommentOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentOrder {
    type Err = CommentTreeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top" => Ok(CommentOrder::Top),
            "oldest" => Ok(CommentOrder::Oldest),
            "latest" => Ok(CommentOrder::Latest),
            other => Err(CommentTreeError::InvalidArgument(format!(
                "Unknown comment order: {}",
                other
            ))),
        }
    }
}

/// A comment with its ordered replies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub comment: Comment,
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    /// Number of nodes in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        let mut len = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            len += 1;
            stack.extend(node.children.iter());
        }
        len
    }

    pub fn is_childless(&self) -> bool {
        self.children.is_empty()
    }
}

// Reply depth is unbounded; unlink the subtree instead of recursing
impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Ordered comment forest for one render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentTree {
    roots: Vec<CommentNode>,
}

impl CommentTree {
    pub fn new(roots: Vec<CommentNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[CommentNode] {
        &self.roots
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Total number of comments in the forest
    pub fn len(&self) -> usize {
        self.roots.iter().map(CommentNode::subtree_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Pre-order traversal
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter {
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// Find a node by comment id
    pub fn find(&self, id: &CommentId) -> Option<&CommentNode> {
        self.iter().find(|node| &node.comment.id == id)
    }
}

/// Pre-order iterator over a [`CommentTree`]
pub struct TreeIter<'a> {
    stack: Vec<&'a CommentNode>,
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = &'a CommentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Snapshot split into roots and replies grouped by parent
struct ThreadIndex {
    roots: Vec<Comment>,
    replies: HashMap<CommentId, Vec<Comment>>,
}

impl ThreadIndex {
    fn new(comments: Vec<Comment>) -> Self {
        let mut by_id: HashMap<CommentId, usize> = HashMap::with_capacity(comments.len());
        let mut unique = Vec::with_capacity(comments.len());
        for comment in comments {
            if by_id.contains_key(&comment.id) {
                warn!("Duplicate comment {} in snapshot, keeping first", comment.id);
                continue;
            }
            by_id.insert(comment.id, unique.len());
            unique.push(comment);
        }

        // Resolve parents before moving comments out of the snapshot
        let parents: Vec<Option<CommentId>> = unique
            .iter()
            .map(|comment| {
                let parent_id = comment.parent_id?;
                match by_id.get(&parent_id).map(|&idx| &unique[idx]) {
                    Some(parent)
                        if parent.id != comment.id
                            && parent.commentable == comment.commentable =>
                    {
                        Some(parent_id)
                    }
                    _ => {
                        warn!(
                            "Comment {} references parent {} outside this thread, treating as root",
                            comment.id, parent_id
                        );
                        None
                    }
                }
            })
            .collect();

        let mut roots = Vec::new();
        let mut replies: HashMap<CommentId, Vec<Comment>> = HashMap::new();
        for (comment, parent) in unique.into_iter().zip(parents) {
            match parent {
                Some(parent_id) => replies.entry(parent_id).or_default().push(comment),
                None => roots.push(comment),
            }
        }

        Self { roots, replies }
    }

    /// Build the subtree under `root` depth-first with an explicit stack
    fn attach(&mut self, root: Comment, order: CommentOrder) -> CommentNode {
        let mut ancestors: Vec<AttachFrame> = Vec::new();
        let mut current = self.frame(root, order);

        loop {
            if let Some(reply) = current.pending.next() {
                let child = self.frame(reply, order);
                ancestors.push(std::mem::replace(&mut current, child));
                continue;
            }

            let node = current.finish();
            match ancestors.pop() {
                Some(mut parent) => {
                    parent.children.push(node);
                    current = parent;
                }
                None => return node,
            }
        }
    }

    fn frame(&mut self, comment: Comment, order: CommentOrder) -> AttachFrame {
        let mut replies = self.replies.remove(&comment.id).unwrap_or_default();
        replies.sort_by(|a, b| order.compare(a, b));

        AttachFrame {
            comment,
            children: Vec::with_capacity(replies.len()),
            pending: replies.into_iter(),
        }
    }

    fn warn_unreachable(&self) {
        let unreachable: usize = self.replies.values().map(Vec::len).sum();
        if unreachable > 0 {
            warn!(
                "Dropped {} comments unreachable from any root (parent cycle)",
                unreachable
            );
        }
    }
}

/// A comment whose sorted replies are still being attached
struct AttachFrame {
    comment: Comment,
    children: Vec<CommentNode>,
    pending: std::vec::IntoIter<Comment>,
}

impl AttachFrame {
    fn finish(self) -> CommentNode {
        CommentNode {
            comment: self.comment,
            children: self.children,
        }
    }
}

/// Builds comment trees from snapshots
pub struct TreeBuilder;

impl TreeBuilder {
    /// Build a forest of at most `limit` roots, each with its full subtree
    pub fn build(comments: Vec<Comment>, limit: usize, order: CommentOrder) -> Result<CommentTree> {
        if limit == 0 {
            return Err(CommentTreeError::InvalidArgument(
                "comment limit must be greater than zero".to_string(),
            ));
        }

        let total = comments.len();
        let mut index = ThreadIndex::new(comments);

        let mut roots = std::mem::take(&mut index.roots);
        roots.sort_by(|a, b| order.compare(a, b));

        let mut nodes: Vec<CommentNode> = roots
            .into_iter()
            .map(|root| index.attach(root, order))
            .collect();
        index.warn_unreachable();

        let root_total = nodes.len();
        nodes.truncate(limit);

        let tree = CommentTree::new(nodes);
        debug!(
            "Built comment tree: {} of {} roots, {} of {} comments, order={}",
            tree.root_count(),
            root_total,
            tree.len(),
            total,
            order
        );
        Ok(tree)
    }

    /// Build the single-root tree used when a comment is opened by permalink
    pub fn build_subtree(
        comments: Vec<Comment>,
        root_id: CommentId,
        order: CommentOrder,
    ) -> Result<CommentTree> {
        let mut index = ThreadIndex::new(comments);

        let root = match find_and_take(&mut index, root_id) {
            Some(root) => root,
            None => return Err(CommentTreeError::CommentNotFound(root_id.to_string())),
        };

        let node = index.attach(root, order);
        debug!(
            "Built permalink tree for comment {}: {} comments",
            root_id,
            node.subtree_len()
        );
        Ok(CommentTree::new(vec![node]))
    }
}

/// Remove a comment from wherever it sits in the index
fn find_and_take(index: &mut ThreadIndex, id: CommentId) -> Option<Comment> {
    if let Some(pos) = index.roots.iter().position(|c| c.id == id) {
        return Some(index.roots.remove(pos));
    }
    for siblings in index.replies.values_mut() {
        if let Some(pos) = siblings.iter().position(|c| c.id == id) {
            return Some(siblings.remove(pos));
        }
    }
    None
}
