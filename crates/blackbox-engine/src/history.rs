//! Bounded undo/redo history.
//!
//! The live value is never stored here: `past` holds the states that preceded
//! each committed mutation (oldest first) and `future` the states undone since
//! the last commit (most recently undone last). Recording a new entry clears
//! `future`; once `past` exceeds `depth` the oldest entry is discarded.

use std::collections::VecDeque;

use blackbox_core::config::DEFAULT_HISTORY_DEPTH;

#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    past: VecDeque<T>,
    future: Vec<T>,
    depth: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl<T> History<T> {
    /// Empty history keeping at most `depth` undo entries (minimum 1).
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Rebuild from persisted stacks, trimming both to `depth`.
    ///
    /// `future` keeps its entries nearest the current state.
    #[must_use]
    pub fn from_parts(past: Vec<T>, future: Vec<T>, depth: usize) -> Self {
        let mut history = Self {
            past: past.into(),
            future,
            depth: depth.max(1),
        };
        history.trim();
        history
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth.max(1);
        self.trim();
    }

    /// Push the state that preceded a commit and drop the redo branch.
    pub fn record(&mut self, previous: T) {
        self.past.push_back(previous);
        self.future.clear();
        self.trim();
    }

    /// Swap `current` with the most recent past entry.
    ///
    /// Returns `false` (leaving `current` untouched) when there is nothing to undo.
    pub fn undo(&mut self, current: &mut T) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        self.future.push(std::mem::replace(current, previous));
        true
    }

    /// Swap `current` with the most recently undone entry.
    pub fn redo(&mut self, current: &mut T) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        self.past.push_back(std::mem::replace(current, next));
        self.trim();
        true
    }

    #[must_use]
    pub fn has_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[must_use]
    pub fn has_redo(&self) -> bool {
        !self.future.is_empty()
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Past entries, oldest first.
    pub fn past(&self) -> impl Iterator<Item = &T> {
        self.past.iter()
    }

    /// Undone entries, next-to-redo last.
    #[must_use]
    pub fn future(&self) -> &[T] {
        &self.future
    }

    fn trim(&mut self) {
        while self.past.len() > self.depth {
            self.past.pop_front();
        }
        if self.future.len() > self.depth {
            let excess = self.future.len() - self.depth;
            self.future.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_trims_long_redo_stack() {
        let history = History::from_parts(vec![1, 2], vec![9, 8, 7, 6], 3);
        assert_eq!(history.undo_len(), 2);
        assert_eq!(history.future(), &[8, 7, 6]);

        let mut history = history;
        let mut current = 3;
        assert!(history.redo(&mut current));
        assert_eq!(current, 6);
    }

    #[test]
    fn undo_on_empty_is_noop() {
        let mut history: History<u32> = History::new(5);
        let mut current = 7;
        assert!(!history.undo(&mut current));
        assert!(!history.redo(&mut current));
        assert_eq!(current, 7);
    }

    #[test]
    fn undo_redo_walks_both_ways() {
        let mut history = History::new(10);
        let mut current = 0;
        for next in 1..=3 {
            history.record(current);
            current = next;
        }
        assert!(history.undo(&mut current));
        assert_eq!(current, 2);
        assert!(history.undo(&mut current));
        assert_eq!(current, 1);
        assert!(history.redo(&mut current));
        assert_eq!(current, 2);
        assert_eq!(history.undo_len(), 2);
        assert_eq!(history.redo_len(), 1);
    }

    #[test]
    fn record_clears_redo_branch() {
        let mut history = History::new(10);
        let mut current = 0;
        history.record(current);
        current = 1;
        assert!(history.undo(&mut current));
        assert!(history.has_redo());
        history.record(current);
        assert!(!history.has_redo());
    }

    #[test]
    fn depth_discards_oldest() {
        let mut history = History::new(3);
        for previous in 0..5 {
            history.record(previous);
        }
        assert_eq!(history.past().copied().collect::<Vec<_>>(), [2, 3, 4]);
    }

    #[test]
    fn set_depth_trims_existing_entries() {
        let mut history = History::from_parts(vec![1, 2, 3, 4], vec![9], 10);
        history.set_depth(2);
        assert_eq!(history.past().copied().collect::<Vec<_>>(), [3, 4]);
        assert_eq!(history.future(), [9]);
    }

    #[test]
    fn zero_depth_keeps_one_entry() {
        let mut history = History::new(0);
        history.record(1);
        history.record(2);
        assert_eq!(history.depth(), 1);
        assert_eq!(history.undo_len(), 1);
    }
}
