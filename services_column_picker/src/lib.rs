//! # Column Picker Service
//!
//! A three-column (Miller) file picker over a frozen [`TreeSnapshot`].
//!
//! ## Philosophy
//!
//! - **Snapshot-scoped**: Only browses the snapshot it was given; never touches storage
//! - **Deterministic**: Every transition is a pure function of state and action
//! - **Forgiving**: Paths missing from the snapshot render as empty columns, never errors
//! - **Testable**: All navigation state is explicit and owned by one controller
//!
//! ## Actions
//!
//! - Click a row to mark it within its column
//! - Double click a directory to slide the window, or a file to open it
//! - Jump through the breadcrumb or the path bar
//! - Go up one level, or back through history
//!
//! ## Example
//!
//! ```
//! use fs_tree::{TreeNode, TreeSnapshot};
//! use services_column_picker::{Column, NavigationController, PickerAction, PickerResult};
//! use std::sync::Arc;
//!
//! let root = TreeNode::directory("", "/", vec![
//!     TreeNode::directory("docs", "/docs", vec![TreeNode::file("a.txt", "/docs/a.txt")]),
//! ]);
//! let mut picker = NavigationController::new(Arc::new(TreeSnapshot::new(root).unwrap()));
//!
//! picker.dispatch(PickerAction::DoubleClick { column: Column::First, path: "/docs".into() });
//! let result = picker.dispatch(PickerAction::DoubleClick {
//!     column: Column::Second,
//!     path: "/docs/a.txt".into(),
//! });
//! assert_eq!(result, PickerResult::OpenFile("/docs/a.txt".into()));
//! ```

pub mod breadcrumb;
pub mod columns;
pub mod history;
pub mod render;

pub use breadcrumb::BreadcrumbSegment;
pub use columns::{Column, ColumnSpec, ColumnWindow, COLUMN_COUNT};
pub use history::HistoryStack;
pub use render::RenderModel;

use fs_tree::path;
use fs_tree::{EntryKind, TreeSnapshot};
use std::sync::Arc;
use tracing::debug;

/// A discrete user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerAction {
    /// Single click on a row
    Click { column: Column, path: String },
    /// Double click on a row
    DoubleClick { column: Column, path: String },
    /// Double click on the breadcrumb segment for a path
    Breadcrumb(String),
    /// Go to the parent of the selection
    Up,
    /// Step back through history
    Back,
    /// Text submitted from the path bar
    SubmitPath(String),
    /// The "Open" button
    Open,
    /// Dismiss the picker
    Close,
}

/// Signal returned to the host after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerResult {
    /// Keep the picker open
    Continue,
    /// A file row was double clicked
    OpenFile(String),
    /// "Open" was pressed with a selection
    OpenSelection(String),
    /// The picker was dismissed
    Closed,
}

/// Navigation state owned by one controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    selected_path: Option<String>,
    history: HistoryStack,
    window: ColumnWindow,
}

impl NavigationState {
    /// Returns the selected path
    pub fn selected_path(&self) -> Option<&str> {
        self.selected_path.as_deref()
    }

    /// Returns the back log
    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Returns the visible columns
    pub fn window(&self) -> &ColumnWindow {
        &self.window
    }
}

/// Drives the picker state machine
#[derive(Debug, Clone)]
pub struct NavigationController {
    snapshot: Arc<TreeSnapshot>,
    state: NavigationState,
    revision: u64,
}

impl NavigationController {
    /// Creates a picker showing the root's children, with unbounded history
    pub fn new(snapshot: Arc<TreeSnapshot>) -> Self {
        Self::with_history(snapshot, HistoryStack::new())
    }

    /// Creates a picker whose history keeps at most `limit` entries (0 = unbounded)
    pub fn with_history_limit(snapshot: Arc<TreeSnapshot>, limit: usize) -> Self {
        Self::with_history(snapshot, HistoryStack::with_limit(limit))
    }

    fn with_history(snapshot: Arc<TreeSnapshot>, history: HistoryStack) -> Self {
        let window = ColumnWindow::root(&snapshot);
        Self {
            snapshot,
            state: NavigationState {
                selected_path: None,
                history,
                window,
            },
            revision: 0,
        }
    }

    /// Applies one action
    pub fn dispatch(&mut self, action: PickerAction) -> PickerResult {
        debug!(?action, revision = self.revision, "dispatch");
        match action {
            PickerAction::Click { column, path } => {
                self.click(column, &path);
                PickerResult::Continue
            }
            PickerAction::DoubleClick { column, path } => self.double_click(column, &path),
            PickerAction::Breadcrumb(target) => {
                let target = path::normalize(&target);
                let window = ColumnWindow::jump(&self.snapshot, &target);
                self.navigate(target, window, true);
                PickerResult::Continue
            }
            PickerAction::Up => {
                self.up();
                PickerResult::Continue
            }
            PickerAction::Back => {
                self.back();
                PickerResult::Continue
            }
            PickerAction::SubmitPath(text) => {
                self.submit_path(&text);
                PickerResult::Continue
            }
            PickerAction::Open => match &self.state.selected_path {
                Some(selected) => PickerResult::OpenSelection(selected.clone()),
                None => PickerResult::Continue,
            },
            PickerAction::Close => PickerResult::Closed,
        }
    }

    /// Installs a fresher snapshot, re-listing every column from its source
    ///
    /// History and selection are kept even if they no longer resolve.
    pub fn replace_snapshot(&mut self, snapshot: Arc<TreeSnapshot>) {
        self.state.window = self.state.window.refresh(&snapshot);
        self.snapshot = snapshot;
        self.revision += 1;
        debug!(revision = self.revision, nodes = self.snapshot.len(), "snapshot replaced");
    }

    /// Returns the current state
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Returns the snapshot being browsed
    pub fn snapshot(&self) -> &Arc<TreeSnapshot> {
        &self.snapshot
    }

    /// Returns the number of state changes so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the path the breadcrumb is built from
    pub fn current_path(&self) -> String {
        path::normalize_opt(self.state.history.current())
    }

    /// Builds the model a presentation layer renders
    pub fn render_model(&self) -> RenderModel {
        let current_path = self.current_path();
        RenderModel {
            revision: self.revision,
            columns: self.state.window.columns().clone(),
            breadcrumb: breadcrumb::build(&current_path, self.state.selected_path.as_deref()),
            selected_path: self.state.selected_path.clone(),
            current_path,
            can_go_back: self.state.history.can_go_back(),
        }
    }

    fn click(&mut self, column: Column, target: &str) {
        let target = path::normalize(target);
        if self.state.window.mark(column, &target) {
            self.state.selected_path = Some(target);
            self.revision += 1;
        } else {
            debug!(?column, path = %target, "click on row not in column");
        }
    }

    fn double_click(&mut self, column: Column, target: &str) -> PickerResult {
        let target = path::normalize(target);
        let kind = self
            .state
            .window
            .column(column)
            .items
            .iter()
            .find(|item| item.path == target)
            .map(|item| item.kind);

        match kind {
            Some(EntryKind::File) => PickerResult::OpenFile(target),
            Some(EntryKind::Directory) => {
                let window = self.state.window.slide(&self.snapshot, column, &target);
                self.navigate(target, window, true);
                PickerResult::Continue
            }
            None => {
                debug!(?column, path = %target, "double click on row not in column");
                PickerResult::Continue
            }
        }
    }

    fn up(&mut self) {
        let parent = match self.state.selected_path.as_deref().and_then(path::parent_of) {
            Some(parent) => parent,
            None => {
                debug!("up without a selection below the root");
                return;
            }
        };
        let window = ColumnWindow::jump(&self.snapshot, &parent);
        self.navigate(parent, window, true);
    }

    fn back(&mut self) {
        match self.state.history.back() {
            Some(previous) => {
                let window = ColumnWindow::jump(&self.snapshot, &previous);
                self.navigate(previous, window, false);
            }
            None => debug!("back with no prior entry"),
        }
    }

    fn submit_path(&mut self, text: &str) {
        match path::parse_input(text) {
            Ok(target) => {
                let window = ColumnWindow::jump(&self.snapshot, &target);
                self.navigate(target, window, true);
            }
            Err(e) => debug!(input = text, error = %e, "ignoring path bar input"),
        }
    }

    fn navigate(&mut self, target: String, window: ColumnWindow, record: bool) {
        if record {
            self.state.history.push(target.clone());
        }
        self.state.window = window;
        self.state.selected_path = Some(target);
        self.revision += 1;
        debug!(
            path = self.state.selected_path.as_deref().unwrap_or(path::ROOT),
            depth = self.state.window.depth(),
            history = self.state.history.len(),
            "navigated"
        );
    }
}
