//! Core editing module
//!
//! This module contains:
//! - The Editor facade that owns store, history, coordinate space, fonts and tool settings

pub mod editor;

pub use editor::Editor;
