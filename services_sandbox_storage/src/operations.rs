//! Storage operations
//!
//! This module defines the contract every sandbox backend fulfils.

use fs_tree::path;
use fs_tree::{Entry, PathError, SnapshotError, SnapshotOptions, TreeNode, TreeSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// Path or name rejected before touching storage
    #[error("Path error: {0}")]
    PathError(#[from] PathError),

    /// Nothing exists at the path
    #[error("Not found: {0}")]
    NotFound(String),

    /// A directory was expected
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// A file was expected
    #[error("Not a file: {0}")]
    NotAFile(String),

    /// The backend cannot currently serve requests
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Host I/O failure (disk-backed storage)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The built tree violated snapshot invariants
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// The scope a sandbox belongs to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Origin(String);

impl Origin {
    /// Creates an origin
    pub fn new(origin: impl Into<String>) -> Self {
        Self(origin.into())
    }

    /// Returns the origin as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a name safe to use as a single host directory component
    ///
    /// Every character outside `[A-Za-z0-9._-]` becomes `_`.
    pub fn dir_name(&self) -> String {
        let name: String = self
            .0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if path::is_valid_name(&name) {
            name
        } else {
            format!("_{}", name)
        }
    }
}

impl Default for Origin {
    fn default() -> Self {
        Self::new("local")
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Origin {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Sandbox storage trait
///
/// Implementations are blocking; callers that must not block run them on a
/// worker (see [`crate::SnapshotLoader`]).
pub trait SandboxStorage: Send + Sync {
    /// The origin this storage is scoped to
    fn origin(&self) -> &Origin;

    /// Builds a full recursive tree rooted at `root_path`
    ///
    /// Children are returned in storage order, not sorted.
    fn build_tree(&self, root_path: &str) -> Result<TreeNode, StorageError>;

    /// Lists one directory level, directories first then by name
    fn list_entries(&self, path: &str) -> Result<Vec<Entry>, StorageError>;

    /// Creates a directory and any missing ancestors
    ///
    /// Succeeds if the directory already exists.
    fn create_directory(&self, path: &str) -> Result<(), StorageError>;

    /// Reads a whole file
    fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Creates or replaces a file; the parent directory must exist
    fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError>;
}

/// Builds a snapshot of the whole sandbox
pub fn load_snapshot(
    storage: &dyn SandboxStorage,
    options: SnapshotOptions,
) -> Result<TreeSnapshot, StorageError> {
    let root = storage.build_tree(path::ROOT)?;
    Ok(TreeSnapshot::with_options(root, options)?)
}

/// Splits and validates a sandbox path
///
/// Every component must be a valid entry name, so a path can never step
/// outside the sandbox root.
pub(crate) fn components(path: &str) -> Result<Vec<&str>, StorageError> {
    let parts = path::segments(path);
    for part in &parts {
        if !path::is_valid_name(part) {
            return Err(PathError::InvalidName(part.to_string()).into());
        }
    }
    Ok(parts)
}

/// Orders a listing directories first, then by name
pub(crate) fn sort_listing(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        b.is_directory()
            .cmp(&a.is_directory())
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use fs_tree::EntryKind;

    #[test]
    fn test_origin_dir_name() {
        assert_eq!(Origin::new("https://example.com").dir_name(), "https___example.com");
        assert_eq!(Origin::new("local").dir_name(), "local");
        assert_eq!(Origin::new("..").dir_name(), "_..");
    }

    #[test]
    fn test_components_rejects_relative() {
        assert!(components("/a/../b").is_err());
        assert_eq!(components("/a/b").unwrap(), vec!["a", "b"]);
        assert!(components("/").unwrap().is_empty());
    }

    #[test]
    fn test_sort_listing() {
        let mut entries = vec![
            Entry::new("b.txt", EntryKind::File, "/b.txt"),
            Entry::new("z", EntryKind::Directory, "/z"),
            Entry::new("a.txt", EntryKind::File, "/a.txt"),
            Entry::new("c", EntryKind::Directory, "/c"),
        ];
        sort_listing(&mut entries);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["c", "z", "a.txt", "b.txt"]);
    }
}
