//! Editor facade owning one annotation session
//!
//! The gesture driver and toolbar talk to this type only: pointer input goes
//! through [`Editor::apply_gesture`], commands through the `handle_*` methods,
//! and the live preview and final export are both produced by the same
//! renderer.

use image::RgbaImage;

use crate::annotations::handlers::{
    self, DragMode, Gesture, TextEdit, handle_edit_msg, handle_gesture, handle_style_msg,
    handle_text_msg,
};
use crate::annotations::hit_test::{self, Cursor};
use crate::config::{Settings, ToolSettings};
use crate::domain::{Annotation, AnnotationId, Handle, Point, Rect};
use crate::export::ExportError;
use crate::render::{FontBook, RenderOptions, render, render_preview};
use crate::session::{
    AnnotationStore, CoordinateSpace, EditMsg, GesturePhase, History, Modifiers, StyleMsg,
    TextMsg,
};

#[derive(Debug)]
pub struct Editor {
    pub(crate) store: AnnotationStore,
    pub(crate) history: History,
    pub(crate) space: CoordinateSpace,
    pub(crate) fonts: FontBook,
    pub(crate) tools: ToolSettings,
    pub(crate) render_options: RenderOptions,
    pub(crate) gesture: Option<Gesture>,
    pub(crate) text_edit: Option<TextEdit>,
}

impl Editor {
    /// Editor for an image of the given pixel size, displayed at native size
    pub fn new(image_width: u32, image_height: u32, fonts: FontBook) -> Self {
        Self {
            store: AnnotationStore::new(),
            history: History::default(),
            space: CoordinateSpace::identity(image_width as f32, image_height as f32),
            fonts,
            tools: ToolSettings::default(),
            render_options: RenderOptions::default(),
            gesture: None,
            text_edit: None,
        }
    }

    /// Take tool defaults and export options from persisted settings
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.tools = settings.tool_settings();
        self.render_options = settings.render_options();
        self.fonts.ensure_loaded(&self.tools.text.font_family);
        self
    }

    /// Start from an existing annotation list (no undo history)
    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        for family in annotations.iter().filter_map(|a| a.text()).map(|t| t.font_family.clone()) {
            self.fonts.ensure_loaded(&family);
        }
        self.store = AnnotationStore::from_annotations(annotations);
        self.history.clear();
        self
    }

    /// Where the image is shown on screen
    pub fn set_display_rect(&mut self, display: Rect) {
        self.space.display = display;
    }

    pub fn coordinate_space(&self) -> &CoordinateSpace {
        &self.space
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.store.annotations()
    }

    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolSettings {
        &mut self.tools
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    pub fn set_render_options(&mut self, options: RenderOptions) {
        self.render_options = options;
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Current tool and export options as a persistable record
    pub fn settings(&self) -> Settings {
        Settings::capture(&self.tools, &self.render_options)
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Feed one pointer event (screen coordinates)
    pub fn apply_gesture(&mut self, phase: GesturePhase, point: Point, modifiers: Modifiers) {
        handle_gesture(self, phase, point, modifiers);
    }

    pub fn handle_edit(&mut self, msg: EditMsg) {
        handle_edit_msg(self, msg);
    }

    pub fn handle_style(&mut self, msg: StyleMsg) {
        handle_style_msg(self, msg);
    }

    pub fn handle_text(&mut self, msg: TextMsg) {
        handle_text_msg(self, msg);
    }

    /// Select one annotation as a click on it would, adopting its style
    pub fn select(&mut self, id: AnnotationId) {
        self.store.select(id);
        if let Some(annotation) = self.store.get(id) {
            self.tools.adopt_style(annotation);
        }
    }

    /// Apply `f` to every selected annotation as one undo step
    pub fn apply_to_selection<F: FnMut(&mut Annotation)>(&mut self, f: F) -> bool {
        handlers::apply_to_selection(self, f)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ========================================================================
    // Feedback
    // ========================================================================

    pub fn drag_mode(&self) -> Option<DragMode> {
        self.gesture.as_ref().map(|g| g.mode)
    }

    /// Marquee rectangle in screen space while selecting by area
    pub fn marquee(&self) -> Option<Rect> {
        self.gesture.as_ref().and_then(|g| g.marquee)
    }

    pub fn text_edit(&self) -> Option<&TextEdit> {
        self.text_edit.as_ref()
    }

    pub fn hover_cursor(&self, point: Point) -> Cursor {
        hit_test::hover_cursor(&self.store, self.tools.tool, point, &self.space, &self.fonts)
    }

    /// Screen positions of the resize handles of the single selected annotation
    pub fn handle_positions(&self) -> Option<[(Handle, Point); 4]> {
        self.store
            .selected_annotation()
            .map(|a| hit_test::handle_positions(a, &self.space, &self.fonts))
    }

    /// Annotations as they should appear right now, including an open text edit
    pub fn display_list(&self) -> Vec<Annotation> {
        let mut list: Vec<Annotation> = match &self.text_edit {
            Some(edit) if !edit.is_new => self
                .store
                .annotations()
                .iter()
                .map(|a| {
                    if a.id == edit.annotation.id {
                        edit.committed()
                    } else {
                        a.clone()
                    }
                })
                .collect(),
            _ => self.store.snapshot(),
        };
        if let Some(edit) = self.text_edit.as_ref().filter(|e| e.is_new) {
            list.push(edit.committed());
        }
        list
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Render what the screen shows, including the annotation being drawn
    pub fn render_preview(&self, base: &RgbaImage) -> Result<RgbaImage, ExportError> {
        render_preview(
            base,
            &self.display_list(),
            self.store.current.as_ref(),
            &self.render_options,
            &self.fonts,
        )
    }

    /// Flatten the committed annotations onto `base`
    pub fn export(&self, base: &RgbaImage) -> Result<RgbaImage, ExportError> {
        render(base, self.store.annotations(), &self.render_options, &self.fonts)
    }
}
