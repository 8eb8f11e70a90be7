//! Pure domain types with minimal dependencies
//!
//! Everything here is plain data: no rendering, no fonts, no I/O.
//! Higher layers (session, annotations, render) build on these.

pub mod annotation;
pub mod geometry;
pub mod selection;

pub use annotation::*;
pub use geometry::*;
pub use selection::*;
