//! Back-only navigation history

/// A linear back log with a cursor
///
/// The cursor always points at the currently displayed path. Pushing while
/// the cursor is not at the tail discards everything after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStack {
    entries: Vec<String>,
    index: usize,
    limit: Option<usize>,
}

impl HistoryStack {
    /// Creates an unbounded, empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty history keeping at most `limit` entries
    ///
    /// A limit of zero means unbounded.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: (limit > 0).then_some(limit),
            ..Self::default()
        }
    }

    /// Records a navigation to `path`
    pub fn push(&mut self, path: impl Into<String>) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(path.into());
        self.index = self.entries.len() - 1;

        if let Some(limit) = self.limit {
            if self.entries.len() > limit {
                let excess = self.entries.len() - limit;
                self.entries.drain(..excess);
                self.index -= excess;
            }
        }
    }

    /// Steps back one entry and returns it
    ///
    /// Returns `None` (and changes nothing) when there is no prior entry.
    pub fn back(&mut self) -> Option<String> {
        if self.entries.is_empty() || self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].clone())
    }

    /// Returns the currently displayed path, if any navigation happened
    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.index).map(String::as_str)
    }

    /// Returns true if `back` would move
    pub fn can_go_back(&self) -> bool {
        !self.entries.is_empty() && self.index > 0
    }

    /// Returns the cursor position
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns all recorded entries, oldest first
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_moves_cursor_to_tail() {
        let mut history = HistoryStack::new();
        history.push("/a");
        history.push("/b");
        assert_eq!(history.index(), 1);
        assert_eq!(history.current(), Some("/b"));
    }

    #[test]
    fn test_back_returns_previous() {
        let mut history = HistoryStack::new();
        history.push("/a");
        history.push("/b");
        assert_eq!(history.back().as_deref(), Some("/a"));
        assert_eq!(history.current(), Some("/a"));
    }

    #[test]
    fn test_push_after_back_discards_forward() {
        let mut history = HistoryStack::new();
        history.push("/a");
        history.push("/b");
        history.back();
        history.push("/c");

        assert_eq!(history.entries(), &["/a".to_string(), "/c".to_string()]);
        assert_eq!(history.back().as_deref(), Some("/a"));
    }

    #[test]
    fn test_back_on_empty_history() {
        let mut history = HistoryStack::new();
        assert_eq!(history.back(), None);
        assert!(history.is_empty());
        assert_eq!(history.current(), None);
    }

    #[test]
    fn test_back_at_first_entry() {
        let mut history = HistoryStack::new();
        history.push("/a");
        assert!(!history.can_go_back());
        assert_eq!(history.back(), None);
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = HistoryStack::with_limit(2);
        history.push("/a");
        history.push("/b");
        history.push("/c");

        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), Some("/c"));
        assert_eq!(history.back().as_deref(), Some("/b"));
        assert_eq!(history.back(), None);
    }

    #[test]
    fn test_zero_limit_is_unbounded() {
        let mut history = HistoryStack::with_limit(0);
        for i in 0..10 {
            history.push(format!("/{}", i));
        }
        assert_eq!(history.len(), 10);
    }
}
