//! Geometry types shared by the batches.
//!
//! Canonical CPU space:
//! - pixels of the current surface (backbuffer or render target)
//! - origin top-left
//! - +X right, +Y down
//!
//! Points and matrices are `glam` types; this module adds the rectangle and
//! viewport helpers the renderer needs on top of them.

mod rect;
mod viewport;

pub use glam::{Mat4, Vec2};
pub use rect::Rect;
pub use viewport::Viewport;
