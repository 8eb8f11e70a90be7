//! Selection types for the annotation editor

use std::collections::BTreeSet;

use super::annotation::AnnotationId;

/// Corner resize handle of a selected annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Handle {
    /// All handles, in the same order as `Rect::corners`
    pub const ALL: [Handle; 4] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
    ];

    /// Handle sits on the left edge
    pub fn is_left(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::BottomLeft)
    }

    /// Handle sits on the top edge
    pub fn is_top(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::TopRight)
    }
}

/// Set of selected annotation ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<AnnotationId>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.ids.contains(&id)
    }

    /// The single selected id, if exactly one is selected
    pub fn single(&self) -> Option<AnnotationId> {
        if self.ids.len() == 1 {
            self.ids.iter().next().copied()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = AnnotationId> + '_ {
        self.ids.iter().copied()
    }

    /// Replace the selection with one id
    pub fn select(&mut self, id: AnnotationId) {
        self.ids.clear();
        self.ids.insert(id);
    }

    pub fn add(&mut self, id: AnnotationId) {
        self.ids.insert(id);
    }

    pub fn toggle(&mut self, id: AnnotationId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    pub fn deselect(&mut self, id: AnnotationId) {
        self.ids.remove(&id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Replace the selection with every id yielded by the iterator
    pub fn set<I: IntoIterator<Item = AnnotationId>>(&mut self, ids: I) {
        self.ids = ids.into_iter().collect();
    }

    /// Drop every id for which `is_live` returns false
    pub fn retain<F: FnMut(AnnotationId) -> bool>(&mut self, mut is_live: F) {
        self.ids.retain(|id| is_live(*id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_only_with_one_id() {
        let mut sel = Selection::default();
        assert_eq!(sel.single(), None);
        sel.select(AnnotationId(4));
        assert_eq!(sel.single(), Some(AnnotationId(4)));
        sel.add(AnnotationId(7));
        assert_eq!(sel.single(), None);
    }

    #[test]
    fn test_toggle_and_retain() {
        let mut sel = Selection::default();
        sel.set([AnnotationId(1), AnnotationId(2), AnnotationId(3)]);
        sel.toggle(AnnotationId(2));
        assert!(!sel.contains(AnnotationId(2)));
        sel.toggle(AnnotationId(2));
        assert!(sel.contains(AnnotationId(2)));

        sel.retain(|id| id.0 != 1);
        assert_eq!(sel.iter().collect::<Vec<_>>(), vec![AnnotationId(2), AnnotationId(3)]);
    }

    #[test]
    fn test_handle_sides() {
        assert!(Handle::TopLeft.is_left() && Handle::TopLeft.is_top());
        assert!(!Handle::BottomRight.is_left() && !Handle::BottomRight.is_top());
        assert!(Handle::BottomLeft.is_left() && !Handle::BottomLeft.is_top());
    }
}
