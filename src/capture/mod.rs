//! Screenshot input
//!
//! This module contains:
//! - The base image type annotations are drawn over (image.rs)

pub mod image;

pub use image::BaseImage;
