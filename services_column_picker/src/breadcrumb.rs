//! Breadcrumb trail

use fs_tree::path;
use serde::Serialize;

/// One clickable prefix of the current path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreadcrumbSegment {
    /// Displayed text (`/` for the root)
    pub label: String,
    /// Cumulative path up to and including this segment
    pub path: String,
    /// Whether this segment matches the selected path
    pub active: bool,
}

/// Builds the trail for `current`, marking the segment equal to `selected`
///
/// # Examples
///
/// ```
/// use services_column_picker::breadcrumb::build;
///
/// let trail = build("/docs/notes", Some("/docs"));
/// let labels: Vec<_> = trail.iter().map(|s| s.label.as_str()).collect();
/// assert_eq!(labels, vec!["/", "docs", "notes"]);
/// assert!(trail[1].active);
/// ```
pub fn build(current: &str, selected: Option<&str>) -> Vec<BreadcrumbSegment> {
    let selected = selected.map(path::normalize);
    path::ancestry(current)
        .into_iter()
        .map(|prefix| {
            let label = match path::file_name(&prefix) {
                "" => path::ROOT.to_string(),
                name => name.to_string(),
            };
            let active = selected.as_deref() == Some(prefix.as_str());
            BreadcrumbSegment {
                label,
                path: prefix,
                active,
            }
        })
        .collect()
}

/// Renders the trail as `/ > docs > [notes]`
pub fn render(trail: &[BreadcrumbSegment]) -> String {
    trail
        .iter()
        .map(|segment| {
            if segment.active {
                format!("[{}]", segment.label)
            } else {
                segment.label.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" > ")
}
