//! Annotation message handlers
//!
//! Drives the gesture state machine and handles EditMsg, StyleMsg and TextMsg.
//! Every handler mutates the editor in place; history checkpoints are taken
//! right before the first real change so clicks never leave empty undo steps.

use super::hit_test::{hit_annotation, hit_handle, screen_bounds};
use super::transform::{ROTATION_THRESHOLD, resized, rotated, rotation_delta, square_end, translated};
use crate::config::Tool;
use crate::core::editor::Editor;
use crate::domain::{Annotation, AnnotationId, AnnotationKind, Handle, Point, Rect};
use crate::render::geometry::{bounding_rect, shape_rect};
use crate::session::messages::{EditMsg, GesturePhase, Modifiers, StyleMsg, TextMsg};

/// Pointer travel (screen pixels) below which a press/release counts as a click
pub const CLICK_DISTANCE: f32 = 3.0;

/// What the active drag does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Drawing,
    Moving,
    Resizing(Handle),
    Rotating,
    Marquee,
    /// Text tool press; releasing opens a new text edit
    PlaceText,
}

/// State of one press-drag-release sequence
#[derive(Debug, Clone)]
pub struct Gesture {
    pub mode: DragMode,
    start_screen: Point,
    start_image: Point,
    /// Annotation list as it was when the gesture began
    snapshot: Vec<Annotation>,
    checkpointed: bool,
    did_rotate: bool,
    /// Already-selected annotation the press landed on
    pressed: Option<AnnotationId>,
    /// Marquee rectangle in screen space
    pub marquee: Option<Rect>,
}

impl Gesture {
    fn original(&self, id: AnnotationId) -> Option<&Annotation> {
        self.snapshot.iter().find(|a| a.id == id)
    }
}

/// Text being typed, either into a new annotation or an existing one
#[derive(Debug, Clone, PartialEq)]
pub struct TextEdit {
    /// Annotation as it will be committed, apart from the text
    pub annotation: Annotation,
    pub is_new: bool,
    pub buffer: String,
}

impl TextEdit {
    /// The annotation carrying the current buffer
    pub fn committed(&self) -> Annotation {
        let mut annotation = self.annotation.clone();
        if let Some(content) = annotation.text_mut() {
            content.text = self.buffer.clone();
        }
        annotation
    }
}

// ============================================================================
// Gestures
// ============================================================================

pub fn handle_gesture(editor: &mut Editor, phase: GesturePhase, point: Point, modifiers: Modifiers) {
    match phase {
        GesturePhase::Began => {
            if let Some(stale) = editor.gesture.take() {
                cancel(editor, stale);
            }
            began(editor, point);
        }
        GesturePhase::Changed => {
            if let Some(mut gesture) = editor.gesture.take() {
                update(editor, &mut gesture, point, modifiers);
                editor.gesture = Some(gesture);
            }
        }
        GesturePhase::Ended => {
            if let Some(mut gesture) = editor.gesture.take() {
                update(editor, &mut gesture, point, modifiers);
                finish(editor, gesture, point);
            }
        }
        GesturePhase::Cancelled => {
            if let Some(gesture) = editor.gesture.take() {
                cancel(editor, gesture);
            }
        }
    }
}

fn began(editor: &mut Editor, point: Point) {
    if editor.text_edit.is_some() {
        commit_text_edit(editor);
    }
    let image_point = editor.space.screen_to_image(point);
    let Some((mode, pressed)) = pick_mode(editor, point, image_point) else {
        return;
    };
    log::debug!("Gesture began: {:?}", mode);
    editor.gesture = Some(Gesture {
        mode,
        start_screen: point,
        start_image: image_point,
        snapshot: editor.store.snapshot(),
        checkpointed: false,
        did_rotate: false,
        pressed,
        marquee: None,
    });
}

/// Classify a press by what lies under the pointer
fn pick_mode(editor: &mut Editor, point: Point, image_point: Point) -> Option<(DragMode, Option<AnnotationId>)> {
    if let Some(selected) = editor.store.selected_annotation()
        && let Some(handle) = hit_handle(selected, point, &editor.space, &editor.fonts)
    {
        return Some((DragMode::Resizing(handle), None));
    }

    if let Some(id) = hit_annotation(editor.store.annotations(), point, &editor.space, &editor.fonts) {
        if editor.store.is_selected(id) {
            return Some((DragMode::Moving, Some(id)));
        }
        editor.store.select(id);
        if let Some(annotation) = editor.store.get(id) {
            editor.tools.adopt_style(annotation);
        }
        return Some((DragMode::Moving, None));
    }

    match editor.store.selection().len() {
        0 => {}
        1 => return Some((DragMode::Rotating, None)),
        _ => editor.store.clear_selection(),
    }

    let mode = match editor.tools.tool {
        Tool::Select => DragMode::Marquee,
        Tool::Text => DragMode::PlaceText,
        tool => {
            let kind = tool.drawing_kind()?;
            let mut annotation = editor
                .store
                .create(kind, image_point, image_point)
                .with_stroke(editor.tools.stroke_color, editor.tools.stroke_width);
            annotation.filled = editor.tools.fill && annotation.can_be_filled();
            editor.store.current = Some(annotation);
            DragMode::Drawing
        }
    };
    Some((mode, None))
}

fn checkpoint(editor: &mut Editor, gesture: &mut Gesture) {
    if !gesture.checkpointed {
        editor.history.save_state(&editor.store);
        gesture.checkpointed = true;
    }
}

fn update(editor: &mut Editor, gesture: &mut Gesture, point: Point, modifiers: Modifiers) {
    let image_point = editor.space.screen_to_image(point);
    match gesture.mode {
        DragMode::Drawing => {
            if let Some(current) = editor.store.current.as_mut() {
                let square = modifiers.shift && Tool::for_kind(&current.kind).constrains_to_square();
                current.end = if square {
                    square_end(current.start, image_point)
                } else {
                    image_point
                };
                if let Some(points) = current.points_mut()
                    && points.last() != Some(&image_point)
                {
                    points.push(image_point);
                }
            }
        }
        DragMode::Moving => {
            let dx = image_point.x - gesture.start_image.x;
            let dy = image_point.y - gesture.start_image.y;
            if dx == 0.0 && dy == 0.0 && !gesture.checkpointed {
                return;
            }
            checkpoint(editor, gesture);
            let ids: Vec<AnnotationId> = editor.store.selection().iter().collect();
            for id in ids {
                if let Some(original) = gesture.original(id) {
                    editor.store.update(translated(original, dx, dy));
                }
            }
        }
        DragMode::Resizing(handle) => {
            let Some(id) = editor.store.selection().single() else {
                return;
            };
            let Some(candidate) = gesture
                .original(id)
                .and_then(|original| resized(original, handle, image_point, modifiers.shift, &editor.fonts))
            else {
                return;
            };
            if !gesture.checkpointed && gesture.original(id) == Some(&candidate) {
                return;
            }
            checkpoint(editor, gesture);
            editor.store.update(candidate);
        }
        DragMode::Rotating => {
            let Some(id) = editor.store.selection().single() else {
                return;
            };
            let Some(original) = gesture.original(id) else {
                return;
            };
            let center = bounding_rect(original, &editor.fonts).center();
            let delta = rotation_delta(center, gesture.start_image, image_point);
            let turned = rotated(original, delta);
            if delta.abs() > ROTATION_THRESHOLD {
                gesture.did_rotate = true;
            }
            if gesture.did_rotate {
                checkpoint(editor, gesture);
                editor.store.update(turned);
            }
        }
        DragMode::Marquee => {
            gesture.marquee = Some(Rect::from_corners(gesture.start_screen, point));
        }
        DragMode::PlaceText => {}
    }
}

fn finish(editor: &mut Editor, gesture: Gesture, point: Point) {
    let is_click = gesture.start_screen.distance(point) < CLICK_DISTANCE;
    match gesture.mode {
        DragMode::Drawing => {
            let Some(current) = editor.store.current.take() else {
                return;
            };
            let frame = shape_rect(&current);
            if frame.width() <= 0.0 && frame.height() <= 0.0 {
                log::debug!("Discarded empty {}", current.kind_name());
                return;
            }
            editor.history.save_state(&editor.store);
            let id = current.id;
            log::debug!("Added {} {}", current.kind_name(), id);
            editor.store.append(current);
            editor.store.select(id);
        }
        DragMode::Moving => {
            if is_click
                && let Some(id) = gesture.pressed
                && editor.store.get(id).is_some_and(Annotation::is_text)
            {
                if gesture.checkpointed {
                    editor.history.rollback(&mut editor.store);
                }
                begin_text_edit(editor, id);
            }
        }
        DragMode::Resizing(_) => {}
        DragMode::Rotating => {
            if !gesture.did_rotate {
                editor.store.clear_selection();
            }
        }
        DragMode::Marquee => {
            let area = gesture
                .marquee
                .unwrap_or_else(|| Rect::from_corners(gesture.start_screen, point));
            let hits: Vec<AnnotationId> = editor
                .store
                .annotations()
                .iter()
                .filter(|a| screen_bounds(a, &editor.space, &editor.fonts).intersects(&area))
                .map(|a| a.id)
                .collect();
            log::debug!("Marquee selected {} annotation(s)", hits.len());
            editor.store.set_selection(hits);
        }
        DragMode::PlaceText => start_new_text(editor, gesture.start_image),
    }
}

fn cancel(editor: &mut Editor, gesture: Gesture) {
    if gesture.checkpointed {
        editor.history.rollback(&mut editor.store);
    }
    editor.store.current = None;
    log::debug!("Gesture cancelled: {:?}", gesture.mode);
}

// ============================================================================
// Edit commands
// ============================================================================

pub fn handle_edit_msg(editor: &mut Editor, msg: EditMsg) {
    match msg {
        EditMsg::Undo => {
            if editor.gesture.is_none() {
                editor.text_edit = None;
                editor.history.undo(&mut editor.store);
            }
        }
        EditMsg::Redo => {
            if editor.gesture.is_none() {
                editor.text_edit = None;
                editor.history.redo(&mut editor.store);
            }
        }
        EditMsg::DeleteSelected => {
            if !editor.store.selection().is_empty() {
                editor.history.save_state(&editor.store);
                editor.store.delete_selected();
            }
        }
        EditMsg::SelectAll => editor.store.select_all(),
        EditMsg::ClearSelection => editor.store.clear_selection(),
        EditMsg::SetTool(tool) => {
            if editor.text_edit.is_some() {
                commit_text_edit(editor);
            }
            editor.tools.tool = tool;
            if tool != Tool::Select {
                editor.store.clear_selection();
            }
        }
    }
}

// ============================================================================
// Style changes
// ============================================================================

pub fn handle_style_msg(editor: &mut Editor, msg: StyleMsg) {
    let tools = &mut editor.tools;
    match &msg {
        StyleMsg::SetStrokeColor(color) => tools.stroke_color = *color,
        StyleMsg::SetStrokeWidth(width) => tools.stroke_width = width.max(0.0),
        StyleMsg::SetFill(fill) => tools.fill = *fill,
        StyleMsg::SetFontFamily(family) => {
            tools.text.font_family = family.clone();
            editor.fonts.ensure_loaded(family);
        }
        StyleMsg::SetFontSize(size) => tools.text.font_size = size.max(1.0),
        StyleMsg::SetAlignment(alignment) => tools.text.alignment = *alignment,
        StyleMsg::SetTextBackground(background) => tools.text.background = *background,
        StyleMsg::SetCornerRadius(radius) => tools.text.corner_radius = radius.max(0.0),
    }

    if let Some(edit) = editor.text_edit.as_mut() {
        apply_style(&mut edit.annotation, &msg);
    }
    apply_to_selection(editor, |annotation| apply_style(annotation, &msg));
}

fn apply_style(annotation: &mut Annotation, msg: &StyleMsg) {
    match msg {
        StyleMsg::SetStrokeColor(color) => annotation.stroke_color = *color,
        StyleMsg::SetStrokeWidth(width) => annotation.stroke_width = width.max(0.0),
        StyleMsg::SetFill(fill) => {
            if annotation.can_be_filled() {
                annotation.filled = *fill;
            }
        }
        _ => {
            let Some(content) = annotation.text_mut() else {
                return;
            };
            match msg {
                StyleMsg::SetFontFamily(family) => content.font_family = family.clone(),
                StyleMsg::SetFontSize(size) => content.font_size = size.max(1.0),
                StyleMsg::SetAlignment(alignment) => content.alignment = *alignment,
                StyleMsg::SetTextBackground(background) => content.background = *background,
                StyleMsg::SetCornerRadius(radius) => content.corner_radius = radius.max(0.0),
                _ => {}
            }
        }
    }
}

/// Apply `f` to every selected annotation as one undo step
///
/// Returns false (and records nothing) when no selected annotation changes.
pub fn apply_to_selection<F: FnMut(&mut Annotation)>(editor: &mut Editor, mut f: F) -> bool {
    let changes = editor.store.selected().any(|annotation| {
        let mut probe = annotation.clone();
        f(&mut probe);
        probe != *annotation
    });
    if !changes {
        return false;
    }
    editor.history.save_state(&editor.store);
    editor.store.update_selected(f);
    true
}

// ============================================================================
// Text editing
// ============================================================================

pub fn handle_text_msg(editor: &mut Editor, msg: TextMsg) {
    match msg {
        TextMsg::SetBuffer(text) => {
            if let Some(edit) = editor.text_edit.as_mut() {
                edit.buffer = text;
            }
        }
        TextMsg::Commit => {
            commit_text_edit(editor);
        }
        TextMsg::Cancel => {
            if editor.text_edit.take().is_some() {
                log::debug!("Text edit cancelled");
            }
        }
    }
}

/// Open an edit on an existing text annotation; clears the selection
pub fn begin_text_edit(editor: &mut Editor, id: AnnotationId) {
    let Some(annotation) = editor.store.get(id).cloned() else {
        return;
    };
    let Some(buffer) = annotation.text().map(|t| t.text.clone()) else {
        return;
    };
    editor.store.clear_selection();
    editor.text_edit = Some(TextEdit {
        annotation,
        is_new: false,
        buffer,
    });
}

/// Open an edit for a new text annotation anchored at `at` (image space)
fn start_new_text(editor: &mut Editor, at: Point) {
    let content = editor.tools.text.content("");
    editor.fonts.ensure_loaded(&content.font_family);
    let annotation = editor
        .store
        .create(AnnotationKind::Text(content), at, at)
        .with_stroke(editor.tools.stroke_color, editor.tools.stroke_width);
    editor.store.clear_selection();
    editor.text_edit = Some(TextEdit {
        annotation,
        is_new: true,
        buffer: String::new(),
    });
}

/// Commit the open text edit, returning the id it left selected
pub fn commit_text_edit(editor: &mut Editor) -> Option<AnnotationId> {
    let edit = editor.text_edit.take()?;
    let committed = edit.committed();
    let id = committed.id;
    let empty = edit.buffer.trim().is_empty();

    if edit.is_new {
        if empty {
            return None;
        }
        editor.history.save_state(&editor.store);
        editor.store.append(committed);
    } else {
        let existing = editor.store.get(id)?;
        if *existing != committed {
            editor.history.save_state(&editor.store);
            if empty {
                editor.store.remove(id);
                log::debug!("Removed emptied text {}", id);
                return None;
            }
            editor.store.update(committed);
        }
    }
    editor.store.select(id);
    Some(id)
}
