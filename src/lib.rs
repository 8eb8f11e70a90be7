//! snapmark: annotation geometry, editing and export engine for screenshot markup
//!
//! The crate is organised leaf to root:
//! - `domain`: plain annotation data, geometry and selection
//! - `render`: bounding boxes, fonts, the padding frame and the tiny-skia rasterizer
//! - `session`: coordinate space, annotation store, undo history and messages
//! - `annotations`: hit testing, transform math and gesture handlers
//! - `core`: the [`Editor`] facade tying it together
//! - `capture` / `export`: image input and PNG/clipboard output
//! - `config`: tool settings and persisted preferences

pub mod annotations;
pub mod capture;
pub mod config;
pub mod core;
pub mod domain;
pub mod export;
pub mod render;
pub mod session;

pub use crate::core::editor::Editor;
pub use export::ExportError;
