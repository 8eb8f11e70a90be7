//! Snapshot-based undo/redo

use super::store::AnnotationStore;
use crate::domain::Annotation;

/// Default number of undo steps kept
pub const DEFAULT_DEPTH: usize = 50;

/// Two stacks of full annotation-list snapshots
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Vec<Annotation>>,
    redo_stack: Vec<Vec<Annotation>>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record the store's list before a mutation; clears redo
    pub fn save_state(&mut self, store: &AnnotationStore) {
        self.undo_stack.push(store.snapshot());
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
        log::debug!(
            "History checkpoint ({} undo step(s))",
            self.undo_stack.len()
        );
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self, store: &mut AnnotationStore) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        let current = store.replace_all(previous);
        self.redo_stack.push(current);
        log::debug!("Undo ({} left)", self.undo_stack.len());
        true
    }

    pub fn redo(&mut self, store: &mut AnnotationStore) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = store.replace_all(next);
        self.undo_stack.push(current);
        log::debug!("Redo ({} left)", self.redo_stack.len());
        true
    }

    /// Drop the newest checkpoint and restore it without touching redo
    ///
    /// Used when a gesture that already checkpointed is cancelled.
    pub fn rollback(&mut self, store: &mut AnnotationStore) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        store.replace_all(previous);
        log::debug!("Rolled back cancelled edit");
        true
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnnotationKind, Point};

    fn push_rect(store: &mut AnnotationStore, history: &mut History) {
        history.save_state(store);
        let a = store.create(AnnotationKind::Rectangle, Point::default(), Point::new(4.0, 4.0));
        store.append(a);
    }

    #[test]
    fn test_undo_redo_symmetry() {
        let mut store = AnnotationStore::new();
        let mut history = History::default();
        push_rect(&mut store, &mut history);
        push_rect(&mut store, &mut history);
        let after = store.snapshot();

        assert!(history.undo(&mut store));
        assert_eq!(store.len(), 1);
        assert!(history.redo(&mut store));
        assert_eq!(store.snapshot(), after);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut store = AnnotationStore::new();
        let mut history = History::default();
        assert!(!history.undo(&mut store));
        assert!(!history.redo(&mut store));
        assert!(!history.rollback(&mut store));
        assert!(!history.can_undo() && !history.can_redo());
    }

    #[test]
    fn test_save_clears_redo() {
        let mut store = AnnotationStore::new();
        let mut history = History::default();
        push_rect(&mut store, &mut history);
        history.undo(&mut store);
        assert!(history.can_redo());
        push_rect(&mut store, &mut history);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut store = AnnotationStore::new();
        let mut history = History::new(3);
        for _ in 0..5 {
            push_rect(&mut store, &mut history);
        }
        let mut steps = 0;
        while history.undo(&mut store) {
            steps += 1;
        }
        assert_eq!(steps, 3);
        // Oldest two checkpoints were dropped
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_undo_prunes_selection() {
        let mut store = AnnotationStore::new();
        let mut history = History::default();
        push_rect(&mut store, &mut history);
        let id = store.annotations()[0].id;
        store.select(id);
        history.undo(&mut store);
        assert!(store.selection().is_empty());
    }

    #[test]
    fn test_rollback_leaves_no_entry() {
        let mut store = AnnotationStore::new();
        let mut history = History::default();
        push_rect(&mut store, &mut history);
        assert!(history.rollback(&mut store));
        assert!(store.is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
