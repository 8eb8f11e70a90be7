//! Annotation rendering module
//!
//! This module contains:
//! - Geometry shared by hit testing, transforms and rasterization
//! - Fonts and text layout
//! - The padding frame (gradient, rounded clip, shadow)
//! - Image rendering using tiny-skia (for export and preview)

pub mod frame;
pub mod geometry;
pub mod image;
pub mod text;

pub use frame::{GradientBackground, PaddingOptions, RenderOptions, ShadowOptions};
pub use image::{render, render_preview};
pub use text::{FallbackMetrics, FontBook, TextMeasure};
