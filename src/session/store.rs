//! Ordered annotation list, in-progress annotation and selection

use crate::domain::{Annotation, AnnotationId, AnnotationKind, Point, Selection};

/// Owns the annotations of one editing session
///
/// Annotations are kept in paint order (last is topmost). Ids come from a
/// counter that only moves forward, so a removed id is never handed out again.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    /// Annotation being drawn by the active gesture
    pub current: Option<Annotation>,
    selection: Selection,
    next_id: u64,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a loaded list; the id counter continues past the highest id
    pub fn from_annotations(annotations: Vec<Annotation>) -> Self {
        let next_id = annotations.iter().map(|a| a.id.0 + 1).max().unwrap_or(0);
        Self {
            annotations,
            current: None,
            selection: Selection::default(),
            next_id,
        }
    }

    pub fn alloc_id(&mut self) -> AnnotationId {
        let id = AnnotationId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create an annotation with a fresh id (not yet appended)
    pub fn create(&mut self, kind: AnnotationKind, start: Point, end: Point) -> Annotation {
        let id = self.alloc_id();
        Annotation::new(id, kind, start, end)
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == id)
    }

    pub fn index_of(&self, id: AnnotationId) -> Option<usize> {
        self.annotations.iter().position(|a| a.id == id)
    }

    pub fn append(&mut self, annotation: Annotation) {
        // Loaded or restored ids must never collide with future allocations
        self.next_id = self.next_id.max(annotation.id.0 + 1);
        self.annotations.push(annotation);
    }

    /// Append the in-progress annotation, returning its id
    pub fn commit_current(&mut self) -> Option<AnnotationId> {
        let annotation = self.current.take()?;
        let id = annotation.id;
        self.append(annotation);
        Some(id)
    }

    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let index = self.index_of(id)?;
        let removed = self.annotations.remove(index);
        self.prune_selection();
        Some(removed)
    }

    /// Remove every annotation matching `predicate`, returning how many went
    pub fn remove_where<F: FnMut(&Annotation) -> bool>(&mut self, mut predicate: F) -> usize {
        let before = self.annotations.len();
        self.annotations.retain(|a| !predicate(a));
        self.prune_selection();
        before - self.annotations.len()
    }

    /// Replace one annotation in place (matched by id); stale ids are ignored
    pub fn update(&mut self, annotation: Annotation) -> bool {
        match self.get_mut(annotation.id) {
            Some(slot) => {
                *slot = annotation;
                true
            }
            None => false,
        }
    }

    /// Apply `f` to every selected annotation
    pub fn update_selected<F: FnMut(&mut Annotation)>(&mut self, mut f: F) {
        for annotation in self.annotations.iter_mut() {
            if self.selection.contains(annotation.id) {
                f(annotation);
            }
        }
    }

    /// Swap in a whole list (undo/redo), returning the previous one
    pub fn replace_all(&mut self, annotations: Vec<Annotation>) -> Vec<Annotation> {
        let previous = std::mem::replace(&mut self.annotations, annotations);
        if let Some(max) = self.annotations.iter().map(|a| a.id.0 + 1).max() {
            self.next_id = self.next_id.max(max);
        }
        self.prune_selection();
        previous
    }

    pub fn snapshot(&self) -> Vec<Annotation> {
        self.annotations.clone()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, id: AnnotationId) -> bool {
        self.selection.contains(id)
    }

    pub fn select(&mut self, id: AnnotationId) {
        if self.index_of(id).is_some() {
            self.selection.select(id);
        }
    }

    pub fn add_to_selection(&mut self, id: AnnotationId) {
        if self.index_of(id).is_some() {
            self.selection.add(id);
        }
    }

    pub fn toggle_selection(&mut self, id: AnnotationId) {
        if self.index_of(id).is_some() {
            self.selection.toggle(id);
        }
    }

    pub fn deselect(&mut self, id: AnnotationId) {
        self.selection.deselect(id);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn select_all(&mut self) {
        self.selection.set(self.annotations.iter().map(|a| a.id));
    }

    pub fn set_selection<I: IntoIterator<Item = AnnotationId>>(&mut self, ids: I) {
        self.selection.set(ids);
        self.prune_selection();
    }

    /// Drop selected ids that no longer name a live annotation
    pub fn prune_selection(&mut self) {
        let annotations = &self.annotations;
        self.selection
            .retain(|id| annotations.iter().any(|a| a.id == id));
    }

    /// The selected annotation when exactly one is selected
    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.selection.single().and_then(|id| self.get(id))
    }

    pub fn selected(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations
            .iter()
            .filter(|a| self.selection.contains(a.id))
    }

    /// Remove the selected annotations and select the next best remaining one
    ///
    /// The next best is whatever now sits at the lowest removed index, clamped
    /// to the end of the list. Returns false when nothing was selected.
    pub fn delete_selected(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        let Some(lowest) = self
            .annotations
            .iter()
            .position(|a| self.selection.contains(a.id))
        else {
            self.selection.clear();
            return false;
        };

        let selection = std::mem::take(&mut self.selection);
        self.annotations.retain(|a| !selection.contains(a.id));

        if let Some(next) = self
            .annotations
            .get(lowest.min(self.annotations.len().saturating_sub(1)))
        {
            self.selection.select(next.id);
        }
        true
    }
}
