//! comment-tree - inspect how comment threads render
//!
//! Loads thread snapshots and prints the render plan a given viewer would
//! get, using the same rules as the web application.
//!
//! ## Quick Start
//!
//! ```bash
//! # Render a snapshot for an anonymous viewer
//! comment-tree render thread.json
//!
//! # Render as a signed-in admin, opened at a permalink
//! comment-tree render thread.json --viewer user:1:admin --permalink 42
//!
//! # Store snapshots and render from the store
//! comment-tree snapshot import thread.json
//! comment-tree render --commentable article-1
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
