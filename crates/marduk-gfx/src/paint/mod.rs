//! Paint model shared by the batches and the GPU backend.
//!
//! Scope:
//! - color representation (RGBA floats)
//! - blend modes applied by shaders at flush time

pub mod blend;
pub mod color;

pub use blend::BlendMode;
pub use color::Color;
