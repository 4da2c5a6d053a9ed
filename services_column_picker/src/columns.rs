//! Three-column window computation
//!
//! The window shows three consecutive directory levels. Column `i` lists the
//! children of its source directory; a column without a source is empty.

use fs_tree::path;
use fs_tree::{Entry, TreeNode, TreeSnapshot};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Number of visible columns
pub const COLUMN_COUNT: usize = 3;

/// Position of a column in the window, shallowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    First,
    Second,
    Third,
}

impl Column {
    /// All columns, left to right
    pub const ALL: [Column; COLUMN_COUNT] = [Column::First, Column::Second, Column::Third];

    /// Returns the zero-based index
    pub fn index(self) -> usize {
        match self {
            Column::First => 0,
            Column::Second => 1,
            Column::Third => 2,
        }
    }

    /// Returns the column for a one-based position (1, 2 or 3)
    pub fn from_position(position: usize) -> Option<Column> {
        match position {
            1 => Some(Column::First),
            2 => Some(Column::Second),
            3 => Some(Column::Third),
            _ => None,
        }
    }
}

/// Contents of one column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    /// Directory whose children are listed, if the column is in use
    pub source: Option<String>,
    /// Listed rows, in snapshot order
    pub items: Vec<Entry>,
    /// Path of the row carrying the selection marker
    pub marked: Option<String>,
}

impl ColumnSpec {
    /// Creates an unused column
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lists the children of `source`
    ///
    /// A source missing from the snapshot, or naming a file, lists nothing.
    pub fn listing(snapshot: &TreeSnapshot, source: &str) -> Self {
        let source = path::normalize(source);
        let items = match snapshot.find_node(&source) {
            Some(TreeNode::Directory { children, .. }) => {
                children.iter().map(TreeNode::entry).collect()
            }
            Some(TreeNode::File { .. }) => Vec::new(),
            None => {
                warn!(path = %source, "column source not in snapshot");
                Vec::new()
            }
        };
        Self {
            source: Some(source),
            items,
            marked: None,
        }
    }

    /// Returns true if nothing is listed
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if a row with this path is listed
    pub fn contains(&self, entry_path: &str) -> bool {
        self.items.iter().any(|item| item.path == entry_path)
    }

    /// Returns the listed names, in order
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.name.as_str()).collect()
    }
}

/// The three visible columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnWindow {
    columns: [ColumnSpec; COLUMN_COUNT],
}

impl ColumnWindow {
    /// Window showing only the root's children
    pub fn root(snapshot: &TreeSnapshot) -> Self {
        Self::jump(snapshot, path::ROOT)
    }

    /// Depth-based jump
    ///
    /// Shows the last three levels of the chain `/`, ..., `target`: for a
    /// target two or more levels deep the columns list the grandparent's,
    /// the parent's and the target's own children. Shallower targets start
    /// the window at the root.
    pub fn jump(snapshot: &TreeSnapshot, target: &str) -> Self {
        let chain = path::ancestry(target);
        let start = chain.len().saturating_sub(COLUMN_COUNT);

        let mut window = Self::default();
        for (slot, source) in chain[start..].iter().enumerate() {
            window.columns[slot] = ColumnSpec::listing(snapshot, source);
        }
        window.mark_chain();
        window
    }

    /// Relative slide after opening the directory `dir_path` from `column`
    ///
    /// - First column: the window re-anchors on the directory, sliding right
    ///   so its grandparent level becomes visible again
    /// - Second column: only the third column changes, to the directory's children
    /// - Third column: the window re-anchors on the directory, sliding left
    ///
    /// Opening from the first or third column is exactly `jump(dir_path)`: the
    /// deepest used column lists the directory's children and the levels above
    /// it stay consecutive.
    pub fn slide(&self, snapshot: &TreeSnapshot, column: Column, dir_path: &str) -> Self {
        match column {
            Column::First | Column::Third => Self::jump(snapshot, dir_path),
            Column::Second => {
                let mut window = self.clone();
                window.columns[Column::Third.index()] = ColumnSpec::listing(snapshot, dir_path);
                window.mark_chain();
                window
            }
        }
    }

    /// Re-lists every column from its source against a newer snapshot
    ///
    /// Markers survive if their row is still listed.
    pub fn refresh(&self, snapshot: &TreeSnapshot) -> Self {
        let mut window = Self::default();
        for (slot, old) in self.columns.iter().enumerate() {
            if let Some(source) = &old.source {
                let mut column = ColumnSpec::listing(snapshot, source);
                column.marked = old.marked.clone().filter(|marked| column.contains(marked));
                window.columns[slot] = column;
            }
        }
        window
    }

    /// Moves the marker within one column
    ///
    /// Returns false, leaving the window unchanged, if the row is not listed there.
    pub fn mark(&mut self, column: Column, entry_path: &str) -> bool {
        let target = &mut self.columns[column.index()];
        if !target.contains(entry_path) {
            return false;
        }
        target.marked = Some(entry_path.to_string());
        true
    }

    /// Returns all columns, left to right
    pub fn columns(&self) -> &[ColumnSpec; COLUMN_COUNT] {
        &self.columns
    }

    /// Returns one column
    pub fn column(&self, column: Column) -> &ColumnSpec {
        &self.columns[column.index()]
    }

    /// Returns the number of columns that list a directory
    pub fn depth(&self) -> usize {
        self.columns.iter().filter(|c| c.source.is_some()).count()
    }

    // Each column marks the row that the next column lists.
    fn mark_chain(&mut self) {
        for slot in 0..COLUMN_COUNT {
            let next = self
                .columns
                .get(slot + 1)
                .and_then(|next| next.source.clone());
            let column = &mut self.columns[slot];
            column.marked = next.filter(|source| column.contains(source));
        }
    }
}
