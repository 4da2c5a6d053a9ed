//! # Sandbox Storage Service
//!
//! Origin-scoped storage backends that supply the hierarchy a picker browses.
//!
//! ## Philosophy
//!
//! - **Scoped**: Each backend serves exactly one origin and cannot be walked out of
//! - **Snapshots, not handles**: The picker sees a frozen [`fs_tree::TreeSnapshot`]
//! - **Last snapshot wins**: A load that finishes after a newer one is discarded
//!
//! ## Operations
//!
//! - `build_tree(path)`: Full recursive tree (children unsorted)
//! - `list_entries(path)`: One level, directories first then by name
//! - `create_directory(path)`: Idempotent, creates intermediate directories
//! - `read_file(path)` / `write_file(path, content)`: Whole-file I/O

pub mod disk;
pub mod loader;
pub mod memory;
pub mod object;
pub mod operations;

pub use disk::DirectoryStorage;
pub use loader::{LoadEvent, LoadTicket, SnapshotLoader, SnapshotSlot};
pub use memory::MemoryStorage;
pub use object::ObjectId;
pub use operations::{load_snapshot, Origin, SandboxStorage, StorageError};
