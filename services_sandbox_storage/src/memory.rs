//! In-memory sandbox storage
//!
//! Directories are maps from names to object links, indexed by ObjectId.
//! There is no global namespace: a storage instance owns one origin's root.

use crate::object::ObjectId;
use crate::operations::{components, sort_listing, Origin, SandboxStorage, StorageError};
use fs_tree::path;
use fs_tree::{Entry, EntryKind, TreeNode};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// A name -> object link inside a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link {
    object_id: ObjectId,
    kind: EntryKind,
}

#[derive(Debug)]
struct Volume {
    root: ObjectId,
    directories: HashMap<ObjectId, HashMap<String, Link>>,
    blobs: HashMap<ObjectId, Vec<u8>>,
}

impl Volume {
    fn new() -> Self {
        let root = ObjectId::new();
        let mut directories = HashMap::new();
        directories.insert(root, HashMap::new());
        Self {
            root,
            directories,
            blobs: HashMap::new(),
        }
    }

    fn root_link(&self) -> Link {
        Link {
            object_id: self.root,
            kind: EntryKind::Directory,
        }
    }

    /// Resolves a full path to a link
    fn resolve(&self, parts: &[&str], path: &str) -> Result<Link, StorageError> {
        let mut current = self.root_link();
        for part in parts {
            let dir = self.directory(current, path)?;
            current = *dir
                .get(*part)
                .ok_or_else(|| StorageError::NotFound(path.to_string()))?;
        }
        Ok(current)
    }

    fn directory(&self, link: Link, path: &str) -> Result<&HashMap<String, Link>, StorageError> {
        if link.kind != EntryKind::Directory {
            return Err(StorageError::NotADirectory(path.to_string()));
        }
        self.directories
            .get(&link.object_id)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    fn build(&self, link: Link, name: &str, node_path: &str) -> Result<TreeNode, StorageError> {
        match link.kind {
            EntryKind::File => Ok(TreeNode::file(name, node_path)),
            EntryKind::Directory => {
                let dir = self.directory(link, node_path)?;
                let mut children = Vec::with_capacity(dir.len());
                for (child_name, child) in dir {
                    let child_path = path::join(node_path, child_name);
                    children.push(self.build(*child, child_name, &child_path)?);
                }
                Ok(TreeNode::directory(name, node_path, children))
            }
        }
    }
}

/// In-memory storage for one origin
#[derive(Debug)]
pub struct MemoryStorage {
    origin: Origin,
    volume: RwLock<Volume>,
}

impl MemoryStorage {
    /// Creates an empty sandbox for the origin
    pub fn new(origin: impl Into<Origin>) -> Self {
        Self {
            origin: origin.into(),
            volume: RwLock::new(Volume::new()),
        }
    }

    /// Returns the number of stored files
    pub fn file_count(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.blobs.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Volume>, StorageError> {
        self.volume
            .read()
            .map_err(|_| StorageError::Unavailable(self.origin.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Volume>, StorageError> {
        self.volume
            .write()
            .map_err(|_| StorageError::Unavailable(self.origin.to_string()))
    }
}

impl SandboxStorage for MemoryStorage {
    fn origin(&self) -> &Origin {
        &self.origin
    }

    fn build_tree(&self, root_path: &str) -> Result<TreeNode, StorageError> {
        let parts = components(root_path)?;
        let volume = self.read()?;
        let link = volume.resolve(&parts, root_path)?;
        let name = parts.last().copied().unwrap_or("");
        volume.build(link, name, &path::normalize(root_path))
    }

    fn list_entries(&self, dir_path: &str) -> Result<Vec<Entry>, StorageError> {
        let parts = components(dir_path)?;
        let volume = self.read()?;
        let link = volume.resolve(&parts, dir_path)?;
        let dir = volume.directory(link, dir_path)?;

        let mut entries: Vec<Entry> = dir
            .iter()
            .map(|(name, child)| Entry::new(name.clone(), child.kind, path::join(dir_path, name)))
            .collect();
        sort_listing(&mut entries);
        Ok(entries)
    }

    fn create_directory(&self, dir_path: &str) -> Result<(), StorageError> {
        let parts = components(dir_path)?;
        let mut volume = self.write()?;

        let mut current = volume.root_link();
        for (depth, part) in parts.iter().enumerate() {
            let so_far = path::prefix(&parts, depth + 1);
            let existing = volume.directory(current, &so_far)?.get(*part).copied();
            current = match existing {
                Some(link) if link.kind == EntryKind::Directory => link,
                Some(_) => return Err(StorageError::NotADirectory(so_far)),
                None => {
                    let link = Link {
                        object_id: ObjectId::new(),
                        kind: EntryKind::Directory,
                    };
                    volume.directories.insert(link.object_id, HashMap::new());
                    volume
                        .directories
                        .get_mut(&current.object_id)
                        .ok_or_else(|| StorageError::NotFound(so_far.clone()))?
                        .insert(part.to_string(), link);
                    debug!(origin = %self.origin, path = %so_far, "directory created");
                    link
                }
            };
        }
        Ok(())
    }

    fn read_file(&self, file_path: &str) -> Result<Vec<u8>, StorageError> {
        let parts = components(file_path)?;
        let volume = self.read()?;
        let link = volume.resolve(&parts, file_path)?;
        if link.kind != EntryKind::File {
            return Err(StorageError::NotAFile(file_path.to_string()));
        }
        volume
            .blobs
            .get(&link.object_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(file_path.to_string()))
    }

    fn write_file(&self, file_path: &str, content: &[u8]) -> Result<(), StorageError> {
        let parts = components(file_path)?;
        let Some((name, parent_parts)) = parts.split_last() else {
            return Err(StorageError::NotAFile(file_path.to_string()));
        };
        let parent_path = path::prefix(parent_parts, parent_parts.len());

        let mut volume = self.write()?;
        let parent = volume.resolve(parent_parts, &parent_path)?;
        let existing = volume.directory(parent, &parent_path)?.get(*name).copied();

        let object_id = match existing {
            Some(link) if link.kind == EntryKind::File => link.object_id,
            Some(_) => return Err(StorageError::NotAFile(file_path.to_string())),
            None => {
                let link = Link {
                    object_id: ObjectId::new(),
                    kind: EntryKind::File,
                };
                volume
                    .directories
                    .get_mut(&parent.object_id)
                    .ok_or_else(|| StorageError::NotFound(parent_path.clone()))?
                    .insert(name.to_string(), link);
                link.object_id
            }
        };
        volume.blobs.insert(object_id, content.to_vec());
        debug!(origin = %self.origin, path = file_path, bytes = content.len(), "file written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_storage_tree() {
        let storage = MemoryStorage::new("test");
        let tree = storage.build_tree("/").unwrap();
        assert_eq!(tree, TreeNode::root());
    }

    #[test]
    fn test_create_directory_is_idempotent() {
        let storage = MemoryStorage::new("test");
        storage.create_directory("/docs/projects").unwrap();
        storage.create_directory("/docs/projects").unwrap();
        storage.create_directory("/docs").unwrap();

        let entries = storage.list_entries("/docs").unwrap();
        assert_eq!(entries, vec![Entry::new("projects", EntryKind::Directory, "/docs/projects")]);
    }

    #[test]
    fn test_create_directory_over_file() {
        let storage = MemoryStorage::new("test");
        storage.write_file("/notes", b"x").unwrap();
        let result = storage.create_directory("/notes/inner");
        assert!(matches!(result, Err(StorageError::NotADirectory(_))));
    }

    #[test]
    fn test_write_and_read() {
        let storage = MemoryStorage::new("test");
        storage.create_directory("/docs").unwrap();
        storage.write_file("/docs/todo.txt", b"milk").unwrap();
        assert_eq!(storage.read_file("/docs/todo.txt").unwrap(), b"milk");

        storage.write_file("/docs/todo.txt", b"eggs").unwrap();
        assert_eq!(storage.read_file("/docs/todo.txt").unwrap(), b"eggs");
        assert_eq!(storage.file_count().unwrap(), 1);
    }

    #[test]
    fn test_write_requires_parent() {
        let storage = MemoryStorage::new("test");
        let result = storage.write_file("/missing/todo.txt", b"x");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_read_directory_fails() {
        let storage = MemoryStorage::new("test");
        storage.create_directory("/docs").unwrap();
        assert!(matches!(storage.read_file("/docs"), Err(StorageError::NotAFile(_))));
        assert!(matches!(storage.read_file("/"), Err(StorageError::NotAFile(_))));
    }

    #[test]
    fn test_list_entries_sorted() {
        let storage = MemoryStorage::new("test");
        storage.write_file("/b.txt", b"").unwrap();
        storage.create_directory("/z").unwrap();
        storage.write_file("/a.txt", b"").unwrap();
        storage.create_directory("/c").unwrap();

        let names: Vec<_> = storage
            .list_entries("/")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["c", "z", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_build_subtree() {
        let storage = MemoryStorage::new("test");
        storage.create_directory("/a/b").unwrap();
        storage.write_file("/a/b/c.txt", b"").unwrap();

        let subtree = storage.build_tree("/a").unwrap();
        assert_eq!(subtree.name(), "a");
        assert_eq!(subtree.path(), "/a");
        let b = &subtree.children().unwrap()[0];
        assert_eq!(b.path(), "/a/b");
        assert_eq!(b.children().unwrap()[0].path(), "/a/b/c.txt");
    }

    #[test]
    fn test_rejects_escaping_path() {
        let storage = MemoryStorage::new("test");
        let result = storage.create_directory("/../etc");
        assert!(matches!(result, Err(StorageError::PathError(_))));
    }
}
