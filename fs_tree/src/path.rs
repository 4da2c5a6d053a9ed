//! Path helpers
//!
//! Pure functions over absolute, `/`-rooted path strings. Nothing in this
//! module performs I/O.

use thiserror::Error;

/// The root path
pub const ROOT: &str = "/";

/// Errors that can occur while interpreting user-supplied paths
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Path text is empty or cannot be used as a path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A single entry name is not usable inside a directory
    #[error("Invalid name: {0}")]
    InvalidName(String),
}

/// Normalizes a path to its absolute form
///
/// The result is `/` followed by the non-empty segments joined with `/`.
/// Empty input yields `/`.
///
/// # Examples
///
/// ```
/// use fs_tree::path::normalize;
///
/// assert_eq!(normalize(""), "/");
/// assert_eq!(normalize("docs/notes/"), "/docs/notes");
/// assert_eq!(normalize("/docs"), "/docs");
/// ```
pub fn normalize(path: &str) -> String {
    let parts = segments(path);
    if parts.is_empty() {
        return ROOT.to_string();
    }
    let mut out = String::with_capacity(path.len() + 1);
    for part in parts {
        out.push('/');
        out.push_str(part);
    }
    out
}

/// Normalizes an optional path; a missing path is the root
pub fn normalize_opt(path: Option<&str>) -> String {
    normalize(path.unwrap_or(""))
}

/// Returns the non-empty segments of a path
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Returns the parent of a path, or `None` for the root
///
/// # Examples
///
/// ```
/// use fs_tree::path::parent_of;
///
/// assert_eq!(parent_of("/"), None);
/// assert_eq!(parent_of("/a").as_deref(), Some("/"));
/// assert_eq!(parent_of("/a/b/c").as_deref(), Some("/a/b"));
/// ```
pub fn parent_of(path: &str) -> Option<String> {
    let parts = segments(path);
    if parts.is_empty() {
        return None;
    }
    Some(prefix(&parts, parts.len() - 1))
}

/// Builds the absolute path made of the first `len` segments
pub fn prefix(parts: &[&str], len: usize) -> String {
    let len = len.min(parts.len());
    if len == 0 {
        return ROOT.to_string();
    }
    let mut out = String::new();
    for part in &parts[..len] {
        out.push('/');
        out.push_str(part);
    }
    out
}

/// Joins a directory path and an entry name
pub fn join(parent: &str, name: &str) -> String {
    let parent = normalize(parent);
    if parent == ROOT {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Returns the last segment of a path (empty for the root)
pub fn file_name(path: &str) -> &str {
    segments(path).last().copied().unwrap_or("")
}

/// Returns the chain of directories from the root down to `path`, inclusive
///
/// `ancestry("/a/b")` is `["/", "/a", "/a/b"]`.
pub fn ancestry(path: &str) -> Vec<String> {
    let parts = segments(path);
    (0..=parts.len()).map(|len| prefix(&parts, len)).collect()
}

/// Validates a single entry name
///
/// Returns true if the name is valid for a directory entry.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\0')
}

/// Parses text typed into the path bar
///
/// Surrounding whitespace is ignored. Empty text and relative components
/// (`.`/`..`) are rejected; anything else is normalized.
pub fn parse_input(text: &str) -> Result<String, PathError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(PathError::InvalidPath("Empty path".to_string()));
    }
    for part in segments(text) {
        if !is_valid_name(part) {
            return Err(PathError::InvalidName(part.to_string()));
        }
    }
    Ok(normalize(text))
}
