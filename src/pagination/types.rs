//! Pagination state

/// Tracks progress of one record reader
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// Documents counted from fully consumed pages
    pub documents_seen: usize,
    /// Pages fetched so far
    pub pages_fetched: u32,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for a consumed page
    pub fn add_page(&mut self, documents: usize) {
        self.pages_fetched += 1;
        self.documents_seen += documents;
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Whether enough documents have been seen for `target`
    pub fn reached(&self, target: usize) -> bool {
        self.documents_seen >= target
    }
}
