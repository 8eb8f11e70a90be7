//! Message types for an editing session
//!
//! This module contains:
//! - Pointer gesture input (phase + modifiers)
//! - Edit commands dispatched by `handle_edit_msg`
//! - Style and text-editing messages

use crate::config::{ShapeColor, TextAlignment, Tool};
use crate::domain::FontFamily;

// ============================================================================
// Gesture Input
// ============================================================================

/// Phase of a pointer drag as reported by the gesture driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    /// Abandon the gesture and restore the pre-gesture state
    Cancelled,
}

/// Keyboard modifiers held during a gesture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Constrain shapes to a square and resizes to the original aspect
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false };
    pub const SHIFT: Modifiers = Modifiers { shift: true };
}

// ============================================================================
// Edit Commands
// ============================================================================

/// Commands on the annotation list
#[derive(Debug, Clone, PartialEq)]
pub enum EditMsg {
    Undo,
    Redo,
    /// Delete the selection and select the next best annotation
    DeleteSelected,
    SelectAll,
    ClearSelection,
    /// Switch the active tool (clears the selection unless switching to Select)
    SetTool(Tool),
}

// ============================================================================
// Style Changes
// ============================================================================

/// Style edits; applied to the tool settings and to every selected annotation
#[derive(Debug, Clone, PartialEq)]
pub enum StyleMsg {
    SetStrokeColor(ShapeColor),
    SetStrokeWidth(f32),
    /// Fill rectangles and ovals
    SetFill(bool),
    SetFontFamily(FontFamily),
    SetFontSize(f32),
    SetAlignment(TextAlignment),
    SetTextBackground(Option<ShapeColor>),
    SetCornerRadius(f32),
}

// ============================================================================
// Text Editing
// ============================================================================

/// Messages for the in-progress text edit
#[derive(Debug, Clone, PartialEq)]
pub enum TextMsg {
    /// Replace the edit buffer with the input widget's contents
    SetBuffer(String),
    Commit,
    Cancel,
}
