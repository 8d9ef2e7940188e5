//! Reader position within the loaded document.
//!
//! `current_page` is only ever written from the flip engine's page-changed
//! events, never optimistically from button presses, so the indicator always
//! reflects the animation's authoritative position.

#[derive(Debug, Clone)]
pub struct ReaderPosition {
    current_page: usize,
    page_count: usize,
}

impl ReaderPosition {
    pub fn new(page_count: usize) -> Self {
        Self {
            current_page: 0,
            page_count,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn last_page(&self) -> usize {
        self.page_count.saturating_sub(1)
    }

    pub fn can_go_prev(&self) -> bool {
        self.current_page > 0
    }

    /// False at the last page and while the page count is still unknown.
    pub fn can_go_next(&self) -> bool {
        self.current_page + 1 < self.page_count
    }

    /// Apply a completed flip's resulting index. Out-of-range indices are
    /// ignored.
    pub fn set_page(&mut self, page: usize) {
        if page < self.page_count {
            self.current_page = page;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_at_first_page() {
        let reader = ReaderPosition::new(5);
        assert!(!reader.can_go_prev());
        assert!(reader.can_go_next());
    }

    #[test]
    fn guards_at_last_page() {
        let mut reader = ReaderPosition::new(5);
        reader.set_page(4);
        assert!(reader.can_go_prev());
        assert!(!reader.can_go_next());
    }

    #[test]
    fn unknown_page_count_blocks_navigation() {
        let reader = ReaderPosition::new(0);
        assert!(!reader.can_go_prev());
        assert!(!reader.can_go_next());
    }

    #[test]
    fn out_of_range_page_is_ignored() {
        let mut reader = ReaderPosition::new(3);
        reader.set_page(2);
        reader.set_page(7);
        assert_eq!(reader.current_page(), 2);
    }

    #[test]
    fn page_changed_event_overrides_prior_state() {
        let mut reader = ReaderPosition::new(10);
        reader.set_page(6);
        reader.set_page(2);
        assert_eq!(reader.current_page(), 2);
    }
}
