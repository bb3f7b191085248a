//! Plain-text outline of a tree snapshot.

use shadow_tree::{Node, NodeRepository};
use std::fmt::Write;

/// Render the tree below `origin` as an indented outline.
///
/// Directories end with `/`; collapsed ones are marked with `+`. Children are
/// printed in item order. Dangling references show up as `?`.
pub fn render_outline(repository: &NodeRepository, origin: &str) -> String {
    let mut out = String::new();
    let label = if origin.is_empty() { "." } else { origin };
    let _ = writeln!(out, "{}/", label);
    if let Some(Node::Dir(dir)) = repository.get(origin) {
        for item in &dir.items {
            render_item(repository, &item.id, 1, &mut out);
        }
    }
    out
}

fn render_item(repository: &NodeRepository, id: &str, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match repository.get(id) {
        Some(Node::File(file)) => {
            let _ = writeln!(out, "{}{}", indent, file.name);
        }
        Some(Node::Dir(dir)) => {
            let marker = if dir.expanded { "" } else { "+" };
            let _ = writeln!(out, "{}{}/{}", indent, dir.name, marker);
            if dir.expanded {
                for item in &dir.items {
                    render_item(repository, &item.id, depth + 1, out);
                }
            }
        }
        None => {
            let _ = writeln!(out, "{}? {}", indent, id);
        }
    }
}
