//! Tree node and entry types
//!
//! This module defines how the sandboxed hierarchy is represented in memory.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a hierarchy entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A directory, which may have children
    Directory,
    /// A file
    File,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Directory => write!(f, "directory"),
            EntryKind::File => write!(f, "file"),
        }
    }
}

/// A single row in a listing
///
/// Carries just enough to render a row and to act on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Entry name
    pub name: String,
    /// Entry kind
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Absolute path of the entry
    pub path: String,
}

impl Entry {
    /// Creates a new entry
    pub fn new(name: impl Into<String>, kind: EntryKind, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            path: path.into(),
        }
    }

    /// Returns true if this entry is a directory
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A node of the hierarchy
///
/// The root is a `Directory` with path `/` and an empty name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    /// A directory and its children
    Directory {
        name: String,
        path: String,
        #[serde(default)]
        children: Vec<TreeNode>,
    },
    /// A file
    File { name: String, path: String },
}

impl TreeNode {
    /// Creates an empty root directory
    pub fn root() -> Self {
        TreeNode::Directory {
            name: String::new(),
            path: crate::path::ROOT.to_string(),
            children: Vec::new(),
        }
    }

    /// Creates a directory node
    pub fn directory(
        name: impl Into<String>,
        path: impl Into<String>,
        children: Vec<TreeNode>,
    ) -> Self {
        TreeNode::Directory {
            name: name.into(),
            path: path.into(),
            children,
        }
    }

    /// Creates a file node
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        TreeNode::File {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Returns the node name
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Directory { name, .. } | TreeNode::File { name, .. } => name,
        }
    }

    /// Returns the absolute node path
    pub fn path(&self) -> &str {
        match self {
            TreeNode::Directory { path, .. } | TreeNode::File { path, .. } => path,
        }
    }

    /// Returns the node kind
    pub fn kind(&self) -> EntryKind {
        match self {
            TreeNode::Directory { .. } => EntryKind::Directory,
            TreeNode::File { .. } => EntryKind::File,
        }
    }

    /// Returns the children of a directory, or `None` for a file
    pub fn children(&self) -> Option<&[TreeNode]> {
        match self {
            TreeNode::Directory { children, .. } => Some(children),
            TreeNode::File { .. } => None,
        }
    }

    /// Returns true if this node is a directory
    pub fn is_directory(&self) -> bool {
        matches!(self, TreeNode::Directory { .. })
    }

    /// Returns the listing row for this node
    pub fn entry(&self) -> Entry {
        Entry::new(self.name(), self.kind(), self.path())
    }

    /// Counts this node and all of its descendants
    pub fn count(&self) -> usize {
        match self {
            TreeNode::Directory { children, .. } => {
                1 + children.iter().map(TreeNode::count).sum::<usize>()
            }
            TreeNode::File { .. } => 1,
        }
    }
}
