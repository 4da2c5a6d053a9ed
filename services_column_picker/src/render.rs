//! Rendering logic for the column picker
//!
//! This module turns the picker state into a serializable render model and
//! lays that model out as plain text.

use crate::breadcrumb::{self, BreadcrumbSegment};
use crate::columns::{ColumnSpec, COLUMN_COUNT};
use fs_tree::Entry;
use serde::Serialize;

const SEPARATOR: &str = " | ";

/// Everything a presentation layer needs after a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderModel {
    /// Incremented on every state change
    pub revision: u64,
    /// The three columns, shallowest first
    pub columns: [ColumnSpec; COLUMN_COUNT],
    /// Trail for the current path
    pub breadcrumb: Vec<BreadcrumbSegment>,
    /// The selected path, if any
    pub selected_path: Option<String>,
    /// Path the breadcrumb is built from
    pub current_path: String,
    /// Whether "Back" would move
    pub can_go_back: bool,
}

impl RenderModel {
    /// Lays the columns out side by side, each `width` characters wide
    pub fn render_columns(&self, width: usize) -> Vec<String> {
        let width = width.max(4);
        let cells: Vec<Vec<String>> = self.columns.iter().map(column_cells).collect();
        let rows = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);

        (0..rows)
            .map(|row| {
                let line = cells
                    .iter()
                    .map(|cell| fit(cell.get(row).map(String::as_str).unwrap_or(""), width))
                    .collect::<Vec<_>>()
                    .join(SEPARATOR);
                line.trim_end().to_string()
            })
            .collect()
    }

    /// Renders the breadcrumb line
    pub fn render_breadcrumb(&self) -> String {
        breadcrumb::render(&self.breadcrumb)
    }

    /// Renders the status line
    pub fn render_status_line(&self) -> String {
        let selection = match &self.selected_path {
            Some(selected) => selected.as_str(),
            None => "nothing selected",
        };
        let back = if self.can_go_back { ", back available" } else { "" };
        format!("{} - {} (rev {}{})", self.current_path, selection, self.revision, back)
    }

    /// Renders the whole frame: breadcrumb, columns, status line
    pub fn render_text(&self, width: usize) -> Vec<String> {
        let mut lines = vec![self.render_breadcrumb()];
        lines.extend(self.render_columns(width));
        lines.push(self.render_status_line());
        lines
    }
}

fn column_cells(column: &ColumnSpec) -> Vec<String> {
    if column.source.is_none() {
        return Vec::new();
    }
    if column.items.is_empty() {
        return vec!["(empty)".to_string()];
    }
    column
        .items
        .iter()
        .map(|entry| format_entry(entry, column.marked.as_deref() == Some(entry.path.as_str())))
        .collect()
}

/// Formats a single entry for display
fn format_entry(entry: &Entry, is_marked: bool) -> String {
    let prefix = if is_marked { "> " } else { "  " };
    let type_marker = if entry.is_directory() { "/" } else { "" };

    format!("{}{}{}", prefix, entry.name, type_marker)
}

/// Pads or truncates to exactly `width` characters
fn fit(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        let mut out = text.to_string();
        out.extend(std::iter::repeat(' ').take(width - len));
        out
    } else {
        let mut out: String = text.chars().take(width - 1).collect();
        out.push('~');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Column, NavigationController, PickerAction};
    use fs_tree::{EntryKind, TreeNode, TreeSnapshot};
    use std::sync::Arc;

    fn create_test_picker() -> NavigationController {
        let root = TreeNode::directory(
            "",
            "/",
            vec![
                TreeNode::directory(
                    "docs",
                    "/docs",
                    vec![TreeNode::file("a-very-long-file-name.txt", "/docs/a-very-long-file-name.txt")],
                ),
                TreeNode::directory("empty", "/empty", Vec::new()),
                TreeNode::file("notes.txt", "/notes.txt"),
            ],
        );
        NavigationController::new(Arc::new(TreeSnapshot::new(root).unwrap()))
    }

    #[test]
    fn test_format_entry() {
        let dir = Entry::new("docs", EntryKind::Directory, "/docs");
        let file = Entry::new("a.txt", EntryKind::File, "/a.txt");
        assert_eq!(format_entry(&dir, true), "> docs/");
        assert_eq!(format_entry(&file, false), "  a.txt");
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc~");
    }

    #[test]
    fn test_initial_frame() {
        let picker = create_test_picker();
        let lines = picker.render_model().render_columns(12);
        assert_eq!(lines, vec!["  docs/", "  empty/", "  notes.txt"]);
    }

    #[test]
    fn test_empty_source_column() {
        let mut picker = create_test_picker();
        picker.dispatch(PickerAction::DoubleClick {
            column: Column::First,
            path: "/empty".to_string(),
        });
        let lines = picker.render_model().render_columns(10);
        assert_eq!(lines[0], "  docs/    | (empty)");
        assert_eq!(lines[1], "> empty/");
    }

    #[test]
    fn test_truncates_long_names() {
        let mut picker = create_test_picker();
        picker.dispatch(PickerAction::DoubleClick {
            column: Column::First,
            path: "/docs".to_string(),
        });
        let lines = picker.render_model().render_columns(8);
        assert_eq!(lines[0], "> docs/  |   a-very~");
    }

    #[test]
    fn test_status_and_breadcrumb() {
        let mut picker = create_test_picker();
        picker.dispatch(PickerAction::SubmitPath("/docs".to_string()));
        let model = picker.render_model();
        assert_eq!(model.render_breadcrumb(), "/ > [docs]");
        assert_eq!(model.render_status_line(), "/docs - /docs (rev 1)");

        let frame = model.render_text(12);
        assert_eq!(frame.first().map(String::as_str), Some("/ > [docs]"));
        assert_eq!(frame.len(), 5);
    }

    #[test]
    fn test_model_serializes() {
        let picker = create_test_picker();
        let json = serde_json::to_value(picker.render_model()).unwrap();
        assert_eq!(json["columns"][0]["items"][0]["type"], "directory");
        assert_eq!(json["breadcrumb"][0]["label"], "/");
        assert!(json["selected_path"].is_null());
    }
}
