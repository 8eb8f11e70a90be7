//! Editing session state
//!
//! This module contains:
//! - Screen/image coordinate mapping
//! - The annotation store and its selection
//! - Undo/redo history
//! - Message types for gestures and edit commands

pub mod coords;
pub mod history;
pub mod messages;
pub mod store;

pub use coords::CoordinateSpace;
pub use history::History;
pub use messages::{EditMsg, GesturePhase, Modifiers, StyleMsg, TextMsg};
pub use store::AnnotationStore;
