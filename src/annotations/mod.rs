//! Annotation editing
//!
//! This module provides:
//! - Hit testing of annotations and resize handles
//! - Move, resize and rotate math
//! - Message handlers for gestures, edit commands, style and text edits

pub mod handlers;
pub mod hit_test;
pub mod transform;

pub use handlers::{DragMode, TextEdit};
pub use hit_test::Cursor;
