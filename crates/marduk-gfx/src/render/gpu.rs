//! Boundary between the batches and the GPU.
//!
//! The batches only ever talk to a [`GpuContext`]. The wgpu implementation
//! lives in [`crate::device`]; tests use a recording double.

use glam::Mat4;

use crate::paint::{BlendMode, Color};

use super::error::GraphicsError;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// Opaque vertex or index buffer handle.
    BufferId
);
handle!(
    /// Opaque texture handle. Images and render targets share this namespace.
    TextureId
);
handle!(
    /// Opaque compiled shader handle.
    ShaderId
);

/// What a buffer holds.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Which batch a shader is written for.
///
/// The kind fixes the vertex layout: shape shaders read position + color,
/// image shaders additionally read a texture coordinate and sample one texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderKind {
    Shape,
    Image,
}

/// Texture sampling filter applied when a batch binds its texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

/// Texture unit image batches bind their texture to.
pub const TEXTURE_UNIT: u32 = 0;

/// GPU operations the renderer core depends on.
///
/// Binding calls are stateful (in the manner of a GL context): a
/// [`draw_indexed`](GpuContext::draw_indexed) call draws with whatever shader,
/// blend mode, projection, texture and render target were bound last.
pub trait GpuContext {
    // ── resources ──────────────────────────────────────────────────────────

    fn create_buffer(&mut self, kind: BufferKind, size: u64, label: &str) -> BufferId;

    /// Replaces the buffer contents starting at offset 0.
    fn write_buffer(&mut self, buffer: BufferId, data: &[u8]);

    /// Compiles and links a WGSL shader. Failure is fatal for the caller.
    fn create_shader(
        &mut self,
        kind: ShaderKind,
        label: &str,
        wgsl: &str,
    ) -> Result<ShaderId, GraphicsError>;

    fn destroy_shader(&mut self, shader: ShaderId);

    /// Uploads tightly packed RGBA8 pixels.
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureId, GraphicsError>;

    /// Creates an off-screen color target that can later be sampled.
    fn create_render_target(&mut self, width: u32, height: u32)
    -> Result<TextureId, GraphicsError>;

    fn destroy_texture(&mut self, texture: TextureId);

    // ── binding state ──────────────────────────────────────────────────────

    fn use_shader(&mut self, shader: ShaderId);

    fn set_blend_mode(&mut self, blend: BlendMode);

    fn set_filter(&mut self, filter: FilterMode);

    fn set_projection(&mut self, projection: &Mat4);

    fn bind_texture(&mut self, unit: u32, texture: TextureId);

    /// `None` selects the backbuffer.
    fn bind_render_target(&mut self, target: Option<TextureId>);

    /// Clears the currently bound render target.
    fn clear(&mut self, color: Color);

    // ── submission ─────────────────────────────────────────────────────────

    fn draw_indexed(&mut self, vertices: BufferId, indices: BufferId, index_count: u32);

    /// Backbuffer size in pixels.
    fn surface_size(&self) -> (u32, u32);
}
