//! # Filesystem Tree
//!
//! Immutable, in-memory snapshots of a sandboxed file hierarchy.
//!
//! ## Philosophy
//!
//! - **Tree as value**: A snapshot is built once per load and never patched
//! - **Paths are lookups**: Resolving a path walks the snapshot, it never touches storage
//! - **Deterministic**: Children are always ordered directories first, then by name
//! - **Exhaustive**: A node is either a directory or a file, and every consumer matches both
//!
//! ## Design
//!
//! - [`TreeNode`] is a sum type rooted at `/`
//! - [`path`] holds the pure path helpers (`normalize`, `parent_of`, `segments`)
//! - [`TreeSnapshot`] validates and orders a tree, then answers `find_node` / `children_of`

pub mod node;
pub mod path;
pub mod snapshot;

pub use node::{Entry, EntryKind, TreeNode};
pub use path::PathError;
pub use snapshot::{find_node, SnapshotError, SnapshotOptions, TreeSnapshot};
