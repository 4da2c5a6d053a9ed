//! Tree snapshots
//!
//! A snapshot is one validated, ordered copy of the hierarchy taken at load
//! time. Any change to the backing storage requires building a new one.

use crate::node::{Entry, TreeNode};
use crate::path;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while building a snapshot
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// The root node is a file or is not named/pathed as the root
    #[error("Invalid root: {0}")]
    InvalidRoot(String),

    /// A node path does not equal its parent path plus its name
    #[error("Path mismatch: expected {expected}, found {found}")]
    PathMismatch { expected: String, found: String },

    /// A directory contains two entries with the same name
    #[error("Duplicate entry {name} in {parent}")]
    DuplicateName { parent: String, name: String },

    /// An entry name is empty or contains reserved characters
    #[error("Invalid entry name {name:?} in {parent}")]
    InvalidName { parent: String, name: String },

    /// The serialized tree could not be decoded
    #[error("Malformed tree: {0}")]
    Malformed(String),
}

/// Options applied while building a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotOptions {
    /// Keep entries whose name starts with `.`
    pub show_hidden: bool,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self { show_hidden: true }
    }
}

/// An immutable snapshot of the hierarchy rooted at `/`
///
/// Children of every directory are ordered directories first, then
/// lexicographically by name, regardless of the order the storage supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSnapshot {
    root: TreeNode,
    node_count: usize,
}

impl TreeSnapshot {
    /// Validates and orders a tree with default options
    pub fn new(root: TreeNode) -> Result<Self, SnapshotError> {
        Self::with_options(root, SnapshotOptions::default())
    }

    /// Validates and orders a tree
    pub fn with_options(mut root: TreeNode, options: SnapshotOptions) -> Result<Self, SnapshotError> {
        match &root {
            TreeNode::Directory { name, path, .. } => {
                if path != path::ROOT || !name.is_empty() {
                    return Err(SnapshotError::InvalidRoot(path.clone()));
                }
            }
            TreeNode::File { path, .. } => {
                return Err(SnapshotError::InvalidRoot(path.clone()));
            }
        }

        validate(&root)?;
        order(&mut root, options);

        let node_count = root.count();
        debug!(nodes = node_count, show_hidden = options.show_hidden, "snapshot built");

        Ok(Self { root, node_count })
    }

    /// Creates a snapshot holding only an empty root
    pub fn empty() -> Self {
        Self {
            root: TreeNode::root(),
            node_count: 1,
        }
    }

    /// Decodes a serialized tree and builds a snapshot from it
    pub fn from_json(json: &str, options: SnapshotOptions) -> Result<Self, SnapshotError> {
        let root: TreeNode =
            serde_json::from_str(json).map_err(|e| SnapshotError::Malformed(e.to_string()))?;
        Self::with_options(root, options)
    }

    /// Returns the root node
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Returns the number of nodes, root included
    pub fn len(&self) -> usize {
        self.node_count
    }

    /// Returns true if the snapshot holds nothing but the root
    pub fn is_empty(&self) -> bool {
        self.node_count <= 1
    }

    /// Looks up a node by path
    pub fn find_node(&self, path: &str) -> Option<&TreeNode> {
        find_node(&self.root, path)
    }

    /// Returns true if the path resolves in this snapshot
    pub fn contains(&self, path: &str) -> bool {
        self.find_node(path).is_some()
    }

    /// Lists the children of the directory at `path`
    ///
    /// Returns `None` if the path does not resolve or names a file.
    pub fn children_of(&self, path: &str) -> Option<Vec<Entry>> {
        self.find_node(path)?
            .children()
            .map(|children| children.iter().map(TreeNode::entry).collect())
    }
}

impl Default for TreeSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Walks `root` following `path` segment by segment
///
/// Returns `None` if a segment is missing or an intermediate node is a file.
pub fn find_node<'a>(root: &'a TreeNode, path: &str) -> Option<&'a TreeNode> {
    let mut current = root;
    for part in path::segments(path) {
        current = current.children()?.iter().find(|child| child.name() == part)?;
    }
    Some(current)
}

fn validate(node: &TreeNode) -> Result<(), SnapshotError> {
    let TreeNode::Directory { path: parent, children, .. } = node else {
        return Ok(());
    };

    let mut seen = HashSet::new();
    for child in children {
        let name = child.name();
        if !path::is_valid_name(name) {
            return Err(SnapshotError::InvalidName {
                parent: parent.clone(),
                name: name.to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(SnapshotError::DuplicateName {
                parent: parent.clone(),
                name: name.to_string(),
            });
        }
        let expected = path::join(parent, name);
        if child.path() != expected {
            return Err(SnapshotError::PathMismatch {
                expected,
                found: child.path().to_string(),
            });
        }
        validate(child)?;
    }
    Ok(())
}

fn order(node: &mut TreeNode, options: SnapshotOptions) {
    if let TreeNode::Directory { children, .. } = node {
        if !options.show_hidden {
            children.retain(|child| !child.name().starts_with('.'));
        }
        children.sort_by(|a, b| {
            b.is_directory()
                .cmp(&a.is_directory())
                .then_with(|| a.name().cmp(b.name()))
        });
        for child in children.iter_mut() {
            order(child, options);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::EntryKind;

    fn create_test_tree() -> TreeNode {
        // Deliberately unsorted
        TreeNode::directory(
            "",
            "/",
            vec![
                TreeNode::file("zebra.txt", "/zebra.txt"),
                TreeNode::directory(
                    "src",
                    "/src",
                    vec![TreeNode::file("main.rs", "/src/main.rs")],
                ),
                TreeNode::file("apple.txt", "/apple.txt"),
                TreeNode::directory("docs", "/docs", Vec::new()),
                TreeNode::file(".env", "/.env"),
            ],
        )
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_deterministic_ordering() {
        let snapshot = TreeSnapshot::new(create_test_tree()).unwrap();
        let children = snapshot.children_of("/").unwrap();
        assert_eq!(
            names(&children),
            vec!["docs", "src", ".env", "apple.txt", "zebra.txt"]
        );
        assert_eq!(children[0].kind, EntryKind::Directory);
    }

    #[test]
    fn test_hidden_entries_filtered() {
        let options = SnapshotOptions { show_hidden: false };
        let snapshot = TreeSnapshot::with_options(create_test_tree(), options).unwrap();
        let children = snapshot.children_of("/").unwrap();
        assert!(!names(&children).contains(&".env"));
        assert!(!snapshot.contains("/.env"));
    }

    #[test]
    fn test_find_node_returns_matching_path() {
        let snapshot = TreeSnapshot::new(create_test_tree()).unwrap();
        for path in ["/", "/src", "/src/main.rs", "/docs", "/apple.txt"] {
            let node = snapshot.find_node(path).unwrap();
            assert_eq!(node.path(), path::normalize(path));
        }
        assert_eq!(snapshot.find_node("src/main.rs/").unwrap().path(), "/src/main.rs");
    }

    #[test]
    fn test_find_node_missing() {
        let snapshot = TreeSnapshot::new(create_test_tree()).unwrap();
        assert!(snapshot.find_node("/nope").is_none());
        assert!(snapshot.find_node("/src/nope").is_none());
    }

    #[test]
    fn test_find_node_through_file() {
        let snapshot = TreeSnapshot::new(create_test_tree()).unwrap();
        assert!(snapshot.find_node("/apple.txt/inner").is_none());
        assert!(snapshot.children_of("/apple.txt").is_none());
    }

    #[test]
    fn test_rejects_file_root() {
        let result = TreeSnapshot::new(TreeNode::file("x", "/x"));
        assert!(matches!(result, Err(SnapshotError::InvalidRoot(_))));
    }

    #[test]
    fn test_rejects_path_mismatch() {
        let tree = TreeNode::directory("", "/", vec![TreeNode::file("a", "/b")]);
        let result = TreeSnapshot::new(tree);
        assert!(matches!(result, Err(SnapshotError::PathMismatch { .. })));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let tree = TreeNode::directory(
            "",
            "/",
            vec![
                TreeNode::file("a", "/a"),
                TreeNode::directory("a", "/a", Vec::new()),
            ],
        );
        let result = TreeSnapshot::new(tree);
        assert!(matches!(result, Err(SnapshotError::DuplicateName { .. })));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "type": "directory", "name": "", "path": "/",
            "children": [
                {"type": "file", "name": "b.txt", "path": "/b.txt"},
                {"type": "directory", "name": "a", "path": "/a", "children": []}
            ]
        }"#;
        let snapshot = TreeSnapshot::from_json(json, SnapshotOptions::default()).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(names(&snapshot.children_of("/").unwrap()), vec!["a", "b.txt"]);
    }

    #[test]
    fn test_from_json_malformed() {
        let result = TreeSnapshot::from_json("{", SnapshotOptions::default());
        assert!(matches!(result, Err(SnapshotError::Malformed(_))));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = TreeSnapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.children_of("/"), Some(Vec::new()));
    }
}
