//! Render command
//!
//! Print the render plan of a comment thread as a viewer would get it.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

use ct_core::config::Config;
use ct_core::pagination::RenderMode;
use ct_core::render::{Disposition, PlanNode};
use ct_core::service::{CommentThreadService, ThreadView};
use ct_core::snapshot::ThreadSnapshot;
use ct_core::tree::CommentOrder;
use ct_core::types::{CommentId, CommentableRef};
use ct_core::viewer::ViewerContext;
use ct_storage::{read_snapshot, FileSystemStore};

/// Arguments for the render command
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Snapshot file to render
    pub snapshot: Option<PathBuf>,

    /// Render a stored snapshot instead of a file (e.g. article-1)
    #[arg(long, conflicts_with = "snapshot")]
    pub commentable: Option<CommentableRef>,

    /// Snapshot store directory
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Viewer: anonymous, user:<id> or user:<id>:<role>,<role>
    #[arg(long, default_value = "anonymous")]
    pub viewer: ViewerContext,

    /// Render the subtree of this comment, as opened by permalink
    #[arg(long)]
    pub permalink: Option<CommentId>,

    /// Maximum number of root comments
    #[arg(long)]
    pub limit: Option<usize>,

    /// Sibling order: top, oldest or latest
    #[arg(long, default_value = "top")]
    pub order: CommentOrder,

    /// Output the plan as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the render command
pub fn execute(args: RenderArgs, config: &Config) -> Result<()> {
    let snapshot = if let Some(reference) = args.commentable {
        let store = match &args.store {
            Some(dir) => FileSystemStore::new(dir)?,
            None => FileSystemStore::default_location()?,
        };
        store
            .load(&reference)
            .with_context(|| format!("Failed to load snapshot {}", reference))?
    } else {
        let Some(path) = &args.snapshot else {
            bail!("Either a snapshot file or --commentable is required");
        };
        read_snapshot(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?
    };

    render_snapshot(&snapshot, &args, config)
}

/// Render a snapshot already read into memory; plan and scores come from the same copy
fn render_snapshot(snapshot: &ThreadSnapshot, args: &RenderArgs, config: &Config) -> Result<()> {
    let reference = snapshot.reference();
    debug!("Rendering {} for {}", reference, args.viewer);
    let service = CommentThreadService::new(snapshot, config);

    let view = match args.permalink {
        Some(comment_id) => service
            .render_permalink(&reference, comment_id, &args.viewer)
            .with_context(|| format!("Failed to render comment {}", comment_id))?,
        None => service
            .render_commentable(&reference, &args.viewer, args.limit, args.order)
            .with_context(|| format!("Failed to render {}", reference))?,
    };

    let scores: HashMap<CommentId, i64> =
        snapshot.comments.iter().map(|c| (c.id, c.score)).collect();
    let rows = plan_rows(&view, &scores);

    if args.json {
        let output = RenderOutput {
            commentable: view.commentable,
            total_comments: view.total_comments,
            mode: view.mode,
            all_comments_visible: view.all_comments_visible,
            permalink_root: view.permalink_root,
            comments: rows,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print!("{}", format_view(&view, &args.viewer, &rows));
    Ok(())
}

/// JSON output of the render command
#[derive(Debug, Serialize)]
struct RenderOutput {
    commentable: CommentableRef,
    total_comments: usize,
    mode: RenderMode,
    all_comments_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    permalink_root: Option<CommentId>,
    comments: Vec<PlanRow>,
}

/// One plan node, flattened in display order
#[derive(Debug, Serialize)]
struct PlanRow {
    comment_id: CommentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<CommentId>,
    depth: usize,
    disposition: Disposition,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    low_quality: bool,
    childless: bool,
    score: Option<i64>,
}

/// Flatten the plan in pre-order without recursing on reply depth
fn plan_rows(view: &ThreadView, scores: &HashMap<CommentId, i64>) -> Vec<PlanRow> {
    let mut rows = Vec::new();
    let mut stack: Vec<(&PlanNode, usize, Option<CommentId>)> =
        view.plan.nodes.iter().rev().map(|node| (node, 0, None)).collect();

    while let Some((node, depth, parent_id)) = stack.pop() {
        rows.push(PlanRow {
            comment_id: node.comment_id,
            parent_id,
            depth,
            disposition: node.disposition,
            low_quality: node.low_quality,
            childless: node.childless,
            score: scores.get(&node.comment_id).copied(),
        });
        stack.extend(
            node.children
                .iter()
                .rev()
                .map(|child| (child, depth + 1, Some(node.comment_id))),
        );
    }

    rows
}

fn format_view(view: &ThreadView, viewer: &ViewerContext, rows: &[PlanRow]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{} {} comments, {} shown to {}\n",
        view.commentable.to_string().bold(),
        view.total_comments,
        view.plan.rendered_count(),
        viewer.to_string().cyan()
    ));

    if let Some(root) = view.permalink_root {
        out.push_str(&format!("Permalink: {}\n", root));
    }
    if !view.all_comments_visible {
        out.push_str(&format!(
            "{}\n",
            "Some comments are hidden from this viewer".yellow()
        ));
    }
    out.push('\n');

    for row in rows {
        out.push_str(&format!(
            "{}#{} {} (score {}){}\n",
            "  ".repeat(row.depth),
            row.comment_id,
            disposition_label(row.disposition),
            row.score
                .map(|score| score.to_string())
                .unwrap_or_else(|| "?".to_string()),
            if row.low_quality {
                format!(" {}", "[low quality]".yellow())
            } else {
                String::new()
            }
        ));
    }

    out
}

fn disposition_label(disposition: Disposition) -> ColoredString {
    match disposition {
        Disposition::Full => "full".green(),
        Disposition::DeletedPlaceholder => "deleted".red(),
        Disposition::HiddenPlaceholder => "hidden".magenta(),
        Disposition::Omit => "omitted".dimmed(),
    }
}
