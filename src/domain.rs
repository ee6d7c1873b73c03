use crate::catalog::{Locator, MediaFilter, MediaItem};
use std::collections::BTreeSet;

pub mod engine;

pub use engine::TriageEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Trash,
}

/// One entry in the undo history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRecord {
    pub decision: Decision,
    pub locator: Locator,
}

/// The authoritative in-memory session model.
///
/// Owned exclusively by [`TriageEngine`]; every exposed mutation keeps the
/// cursor inside `[0, max(1, len))`. The item list is replaced wholesale on
/// filter change and reconciliation, never mutated in place.
#[derive(Debug, Default)]
pub struct SessionState {
    items: Vec<MediaItem>,
    cursor: usize,
    pub pending_trash: BTreeSet<Locator>,
    pub staged_for_review: BTreeSet<Locator>,
    pub history: Vec<DecisionRecord>,
    pub filter: MediaFilter,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_item(&self) -> Option<&MediaItem> {
        self.items.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replaces the item list and re-seats the cursor
    pub fn replace_items(&mut self, items: Vec<MediaItem>, cursor: usize) {
        self.items = items;
        self.cursor = cursor;
        self.clamp_cursor();
    }

    /// Moves the cursor, clamping into bounds
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
        self.clamp_cursor();
    }

    /// Advances one step around the ring
    pub fn advance(&mut self) {
        if !self.items.is_empty() {
            self.cursor = (self.cursor + 1) % self.items.len();
        } else {
            self.cursor = 0;
        }
    }

    /// Retreats one step around the ring
    pub fn retreat(&mut self) {
        if !self.items.is_empty() {
            self.cursor = (self.cursor + self.items.len() - 1) % self.items.len();
        } else {
            self.cursor = 0;
        }
    }

    fn clamp_cursor(&mut self) {
        if self.items.is_empty() {
            self.cursor = 0;
        } else if self.cursor >= self.items.len() {
            self.cursor = self.items.len() - 1;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::image_items;
    use super::*;

    mod session_state_tests {
        use super::*;

        #[test]
        fn test_new_session_is_empty() {
            let state = SessionState::new();
            assert!(state.is_empty());
            assert_eq!(state.len(), 0);
            assert_eq!(state.cursor(), 0);
            assert!(state.current_item().is_none());
            assert!(state.pending_trash.is_empty());
            assert!(state.history.is_empty());
        }

        #[test]
        fn test_current_item() {
            let mut state = SessionState::new();
            state.replace_items(image_items(&["a.jpg", "b.jpg"]), 0);
            assert_eq!(state.current_item().unwrap().id, "a.jpg");

            state.set_cursor(1);
            assert_eq!(state.current_item().unwrap().id, "b.jpg");
        }

        #[test]
        fn test_replace_items_clamps_cursor() {
            let mut state = SessionState::new();
            state.replace_items(image_items(&["a.jpg", "b.jpg", "c.jpg"]), 2);
            assert_eq!(state.cursor(), 2);

            state.replace_items(image_items(&["a.jpg"]), 2);
            assert_eq!(state.cursor(), 0);

            state.replace_items(Vec::new(), 5);
            assert_eq!(state.cursor(), 0);
            assert!(state.current_item().is_none());
        }

        #[test]
        fn test_set_cursor_out_of_range_is_clamped() {
            let mut state = SessionState::new();
            state.replace_items(image_items(&["a.jpg", "b.jpg"]), 0);
            state.set_cursor(99);
            assert_eq!(state.cursor(), 1);
        }

        #[test]
        fn test_advance_wraps_around() {
            let mut state = SessionState::new();
            state.replace_items(image_items(&["a.jpg", "b.jpg", "c.jpg"]), 0);

            state.advance();
            assert_eq!(state.cursor(), 1);
            state.advance();
            assert_eq!(state.cursor(), 2);
            state.advance();
            assert_eq!(state.cursor(), 0);
        }

        #[test]
        fn test_retreat_wraps_around() {
            let mut state = SessionState::new();
            state.replace_items(image_items(&["a.jpg", "b.jpg", "c.jpg"]), 0);

            state.retreat();
            assert_eq!(state.cursor(), 2);
            state.retreat();
            assert_eq!(state.cursor(), 1);
        }

        #[test]
        fn test_navigation_on_empty_stays_at_zero() {
            let mut state = SessionState::new();
            state.advance();
            assert_eq!(state.cursor(), 0);
            state.retreat();
            assert_eq!(state.cursor(), 0);
        }
    }
}
