//! Batched immediate-mode renderer.
//!
//! Drawing calls go through [`Graphics`], which routes them into one of two
//! fixed-capacity batches (untextured triangles, textured quads) and turns
//! each batch into a single indexed draw on flush. All GPU access goes
//! through the [`GpuContext`] trait injected at construction.
//!
//! Convention:
//! - geometry is in pixels of the current target (top-left origin, +Y down)
//! - vertices are transformed and tinted when appended, not when flushed

mod buffer;
mod error;
mod font;
mod gpu;
mod graphics;
mod image_batch;
mod shader;
mod shape_batch;
mod state;
mod target;
mod texture;
mod transform;
mod vertex;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{GeometryError, GraphicsError};
pub use font::{BitmapFont, CharData};
pub use gpu::{BufferId, BufferKind, FilterMode, GpuContext, ShaderId, ShaderKind, TEXTURE_UNIT, TextureId};
pub use graphics::{Clear, FrameStats, Graphics, GraphicsConfig, IMAGE_WGSL, SHAPE_WGSL};
pub use image_batch::Flip;
pub use shader::Shader;
pub use shape_batch::LineAlign;
pub use target::TargetStack;
pub use texture::{RenderTarget, Texture, TextureSource};
pub use transform::TransformStack;
pub use vertex::{ImageVertex, ShapeVertex};
