//! Disk-backed sandbox storage
//!
//! Each origin is confined to `<base>/<origin dir name>`. Sandbox paths are
//! validated component by component before they are joined onto the host
//! root, and symlinks are never followed.

use crate::operations::{components, sort_listing, Origin, SandboxStorage, StorageError};
use fs_tree::path;
use fs_tree::{Entry, EntryKind, TreeNode};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Storage for one origin inside a host directory
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    origin: Origin,
    root: PathBuf,
}

impl DirectoryStorage {
    /// Opens (creating if needed) the sandbox for `origin` under `base`
    pub fn open(base: impl AsRef<Path>, origin: impl Into<Origin>) -> Result<Self, StorageError> {
        let origin = origin.into();
        let root = base.as_ref().join(origin.dir_name());
        fs::create_dir_all(&root)?;
        debug!(origin = %origin, root = %root.display(), "sandbox opened");
        Ok(Self { origin, root })
    }

    /// Returns the host directory backing this sandbox
    pub fn host_root(&self) -> &Path {
        &self.root
    }

    /// Maps a sandbox path onto the host, refusing to pass through symlinks
    ///
    /// Every existing component is checked with `symlink_metadata`; a symlink
    /// reports as not found, the same as it does in listings.
    fn host_path(&self, sandbox_path: &str) -> Result<PathBuf, StorageError> {
        let parts = components(sandbox_path)?;
        let mut host = self.root.clone();
        let mut existing = true;
        for (depth, part) in parts.iter().enumerate() {
            host.push(part);
            if !existing {
                continue;
            }
            match fs::symlink_metadata(&host) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    let linked = path::prefix(&parts, depth + 1);
                    warn!(origin = %self.origin, path = %linked, "refusing to follow symlink");
                    return Err(StorageError::NotFound(linked));
                }
                Ok(_) => {}
                Err(_) => existing = false,
            }
        }
        Ok(host)
    }

    fn build(&self, host: &Path, name: &str, node_path: &str) -> Result<TreeNode, StorageError> {
        let mut children = Vec::new();
        for (child_name, kind) in read_level(host, node_path)? {
            let child_path = path::join(node_path, &child_name);
            let child = match kind {
                EntryKind::File => TreeNode::file(child_name, child_path),
                EntryKind::Directory => {
                    self.build(&host.join(&child_name), &child_name, &child_path)?
                }
            };
            children.push(child);
        }
        Ok(TreeNode::directory(name, node_path, children))
    }
}

/// Reads one directory level, keeping plain files and directories with UTF-8 names
fn read_level(host: &Path, sandbox_path: &str) -> Result<Vec<(String, EntryKind)>, StorageError> {
    let read_dir = fs::read_dir(host).map_err(|e| map_io(e, sandbox_path))?;
    let mut level = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            continue;
        };
        match entry.file_name().into_string() {
            Ok(name) => level.push((name, kind)),
            Err(raw) => warn!(parent = sandbox_path, name = ?raw, "skipping non UTF-8 entry"),
        }
    }
    Ok(level)
}

fn map_io(err: std::io::Error, sandbox_path: &str) -> StorageError {
    match err.kind() {
        ErrorKind::NotFound => StorageError::NotFound(sandbox_path.to_string()),
        _ => StorageError::Io(err),
    }
}

impl SandboxStorage for DirectoryStorage {
    fn origin(&self) -> &Origin {
        &self.origin
    }

    fn build_tree(&self, root_path: &str) -> Result<TreeNode, StorageError> {
        let host = self.host_path(root_path)?;
        let node_path = path::normalize(root_path);
        let name = path::file_name(&node_path).to_string();

        let meta = fs::symlink_metadata(&host).map_err(|e| map_io(e, &node_path))?;
        if meta.is_file() {
            return Ok(TreeNode::file(name, node_path));
        }
        if !meta.is_dir() {
            return Err(StorageError::NotFound(node_path));
        }
        self.build(&host, &name, &node_path)
    }

    fn list_entries(&self, dir_path: &str) -> Result<Vec<Entry>, StorageError> {
        let host = self.host_path(dir_path)?;
        if host.is_file() {
            return Err(StorageError::NotADirectory(dir_path.to_string()));
        }
        let mut entries: Vec<Entry> = read_level(&host, dir_path)?
            .into_iter()
            .map(|(name, kind)| {
                let entry_path = path::join(dir_path, &name);
                Entry::new(name, kind, entry_path)
            })
            .collect();
        sort_listing(&mut entries);
        Ok(entries)
    }

    fn create_directory(&self, dir_path: &str) -> Result<(), StorageError> {
        let parts = components(dir_path)?;
        let host = self.host_path(dir_path)?;
        let mut walked = self.root.clone();
        for (depth, part) in parts.iter().enumerate() {
            walked.push(part);
            if walked.is_file() {
                return Err(StorageError::NotADirectory(path::prefix(&parts, depth + 1)));
            }
        }
        fs::create_dir_all(&host)?;
        Ok(())
    }

    fn read_file(&self, file_path: &str) -> Result<Vec<u8>, StorageError> {
        let host = self.host_path(file_path)?;
        if host.is_dir() {
            return Err(StorageError::NotAFile(file_path.to_string()));
        }
        fs::read(&host).map_err(|e| map_io(e, file_path))
    }

    fn write_file(&self, file_path: &str, content: &[u8]) -> Result<(), StorageError> {
        let parts = components(file_path)?;
        if parts.is_empty() {
            return Err(StorageError::NotAFile(file_path.to_string()));
        }
        let parent_path = path::prefix(&parts, parts.len() - 1);
        let host = self.host_path(file_path)?;

        match host.parent() {
            Some(parent) if parent.is_dir() => {}
            _ => return Err(StorageError::NotFound(parent_path)),
        }
        if host.is_dir() {
            return Err(StorageError::NotAFile(file_path.to_string()));
        }
        fs::write(&host, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_storage() -> (TempDir, DirectoryStorage) {
        let base = TempDir::new().unwrap();
        let storage = DirectoryStorage::open(base.path(), "https://example.com").unwrap();
        (base, storage)
    }

    #[test]
    fn test_open_creates_origin_directory() {
        let (base, storage) = create_storage();
        assert_eq!(storage.host_root(), base.path().join("https___example.com"));
        assert!(storage.host_root().is_dir());
    }

    #[test]
    fn test_write_read_roundtrip() {
        let (_base, storage) = create_storage();
        storage.create_directory("/docs").unwrap();
        storage.write_file("/docs/a.txt", b"hello").unwrap();
        assert_eq!(storage.read_file("/docs/a.txt").unwrap(), b"hello");
    }

    #[test]
    fn test_create_directory_idempotent() {
        let (_base, storage) = create_storage();
        storage.create_directory("/a/b/c").unwrap();
        storage.create_directory("/a/b/c").unwrap();
        assert!(storage.host_root().join("a/b/c").is_dir());
    }

    #[test]
    fn test_write_requires_parent() {
        let (_base, storage) = create_storage();
        let result = storage.write_file("/nope/a.txt", b"x");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_read_missing() {
        let (_base, storage) = create_storage();
        assert!(matches!(storage.read_file("/missing"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_build_tree() {
        let (_base, storage) = create_storage();
        storage.create_directory("/src").unwrap();
        storage.write_file("/src/main.rs", b"fn main() {}").unwrap();
        storage.write_file("/README.md", b"").unwrap();

        let tree = storage.build_tree("/").unwrap();
        assert_eq!(tree.path(), "/");
        assert_eq!(tree.name(), "");
        assert_eq!(tree.count(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_not_found() {
        let (base, storage) = create_storage();
        let outside = base.path().join("outside.txt");
        fs::write(&outside, b"outside").unwrap();
        std::os::unix::fs::symlink(&outside, storage.host_root().join("alias.txt")).unwrap();

        assert!(matches!(storage.read_file("/alias.txt"), Err(StorageError::NotFound(_))));
        assert!(matches!(
            storage.write_file("/alias.txt", b"x"),
            Err(StorageError::NotFound(_))
        ));
        assert_eq!(fs::read(&outside).unwrap(), b"outside");
    }

    #[test]
    fn test_rejects_escape() {
        let (_base, storage) = create_storage();
        assert!(matches!(
            storage.read_file("/../secret"),
            Err(StorageError::PathError(_))
        ));
    }
}
