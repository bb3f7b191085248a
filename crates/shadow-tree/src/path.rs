//! Helpers for slash-delimited vault paths.
//!
//! Paths double as node ids. They never carry a leading separator, and the
//! empty string names the top of the vault.

/// Path separator used by every id in the tree.
pub const SEPARATOR: char = '/';

/// Last segment of `path`: "notes/daily/today.md" -> "today.md"
pub fn name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// All segments except the last: "notes/daily/today.md" -> "notes/daily"
///
/// Returns the empty string for a single-segment path, whose parent is the origin.
pub fn parent_id(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(pos) => &path[..pos],
        None => "",
    }
}

/// Join a parent id and a segment: ("notes", "today.md") -> "notes/today.md"
pub fn child_id(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}{}{}", parent, SEPARATOR, segment)
    }
}

/// Ancestor ids of `path` from the root segment down, excluding `path` itself.
///
/// "a/b/c.md" yields ["a", "a/b"].
pub fn ancestor_ids(path: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let mut current = String::new();
    let parent = parent_id(path);
    if parent.is_empty() {
        return ids;
    }
    for segment in parent.split(SEPARATOR) {
        current = child_id(&current, segment);
        ids.push(current.clone());
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name() {
        assert_eq!(name("a/b/c.md"), "c.md");
        assert_eq!(name("c.md"), "c.md");
        assert_eq!(name(""), "");
    }

    #[test]
    fn test_parent_id() {
        assert_eq!(parent_id("a/b/c.md"), "a/b");
        assert_eq!(parent_id("a/b"), "a");
        assert_eq!(parent_id("c.md"), "");
    }

    #[test]
    fn test_child_id() {
        assert_eq!(child_id("", "a"), "a");
        assert_eq!(child_id("a/b", "c.md"), "a/b/c.md");
    }

    #[test]
    fn test_child_of_parent_round_trips() {
        let path = "projects/rust/notes.md";
        assert_eq!(child_id(parent_id(path), name(path)), path);
    }

    #[test]
    fn test_ancestor_ids() {
        assert_eq!(ancestor_ids("a/b/c.md"), vec!["a", "a/b"]);
        assert!(ancestor_ids("c.md").is_empty());
        assert!(ancestor_ids("").is_empty());
    }
}
