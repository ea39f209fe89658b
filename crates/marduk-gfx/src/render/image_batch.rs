//! Textured quad batch.
//!
//! A batch only ever holds quads for one texture: appending a quad for a
//! different texture flushes what is pending first. Images, sprite-sheet
//! frames, render targets and glyphs all go through [`ImageBatch::append`].

use glam::{Mat4, Vec2};

use super::buffer::{BatchBuffer, Quad};
use super::font::BitmapFont;
use super::gpu::{GpuContext, ShaderKind, TEXTURE_UNIT, TextureId};
use super::shader::Shader;
use super::state::DrawState;
use super::texture::{RenderTarget, TextureSource};
use super::vertex::{ImageVertex, transform_point};
use crate::coords::Rect;

/// Mirroring applied to a quad's texture coordinates.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Flip {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl Flip {
    pub fn from_flags(horizontal: bool, vertical: bool) -> Self {
        match (horizontal, vertical) {
            (false, false) => Flip::None,
            (true, false) => Flip::Horizontal,
            (false, true) => Flip::Vertical,
            (true, true) => Flip::Both,
        }
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            Flip::None => 0,
            Flip::Horizontal => 1,
            Flip::Vertical => 2,
            Flip::Both => 3,
        }
    }
}

/// Unit-square texture coordinate per quad corner (tl, tr, br, bl), by flip.
const FLIP_UVS: [[Vec2; 4]; 4] = [
    [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)],
    [Vec2::new(1.0, 0.0), Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0)],
    [Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 0.0)],
    [Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0), Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)],
];

/// Normalized coordinates of `frame` (texture pixels) under `flip`.
fn frame_uvs(frame: Rect, texture_size: Vec2, flip: Flip) -> [Vec2; 4] {
    let size = texture_size.max(Vec2::ONE);
    FLIP_UVS[flip.index()].map(|sel| (frame.origin + sel * frame.size) / size)
}

fn source_size(source: &impl TextureSource) -> Vec2 {
    Vec2::new(source.width() as f32, source.height() as f32)
}

pub(crate) struct ImageBatch {
    buffer: BatchBuffer<ImageVertex, Quad>,
    default_shader: Shader,
    shader: Shader,
    /// Texture of every pending quad; `None` while idle.
    bound: Option<TextureId>,
}

impl ImageBatch {
    pub fn new<G: GpuContext + ?Sized>(gpu: &mut G, capacity: usize, default_shader: Shader) -> Self {
        Self {
            buffer: BatchBuffer::new(gpu, capacity, "image batch"),
            default_shader,
            shader: default_shader,
            bound: None,
        }
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.buffer.pending()
    }

    #[inline]
    pub fn bound_texture(&self) -> Option<TextureId> {
        self.bound
    }

    #[inline]
    pub fn shader(&self) -> &Shader {
        &self.shader
    }

    #[inline]
    pub fn default_shader(&self) -> &Shader {
        &self.default_shader
    }

    pub fn stats(&self) -> (u32, u32) {
        self.buffer.stats()
    }

    pub fn reset_stats(&mut self) {
        self.buffer.reset_stats();
    }

    pub fn discard(&mut self) -> usize {
        self.bound = None;
        self.buffer.discard()
    }

    pub fn flush<G: GpuContext + ?Sized>(&mut self, gpu: &mut G, projection: &Mat4) -> usize {
        let Some(texture) = self.bound.take() else {
            return 0;
        };
        if self.buffer.is_empty() {
            return 0;
        }
        gpu.use_shader(self.shader.id());
        gpu.set_blend_mode(self.shader.blend());
        gpu.set_projection(projection);
        gpu.bind_texture(TEXTURE_UNIT, texture);
        gpu.set_filter(self.shader.filter());
        self.buffer.submit(gpu)
    }

    /// `None` restores the built-in shader. Shape shaders are ignored.
    pub fn set_shader<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        projection: &Mat4,
        shader: Option<&Shader>,
    ) {
        let next = match shader {
            None => self.default_shader,
            Some(s) if s.kind() == ShaderKind::Image => *s,
            Some(s) => {
                log::debug!("ignoring {:?} shader {:?} for the image batch", s.kind(), s.id());
                return;
            }
        };
        if next == self.shader {
            return;
        }
        self.flush(gpu, projection);
        self.shader = next;
    }

    /// Writes one quad sampling `texture`.
    ///
    /// Flushes first when the pending quads use another texture or the
    /// buffer is full.
    fn append<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        state: &DrawState,
        texture: TextureId,
        corners: [Vec2; 4],
        uvs: [Vec2; 4],
    ) {
        if self.bound.is_some_and(|bound| bound != texture) || self.buffer.is_full() {
            self.flush(gpu, &state.projection);
        }
        self.bound = Some(texture);

        let m = &state.transform;
        let quad: [ImageVertex; 4] =
            std::array::from_fn(|i| ImageVertex::new(transform_point(m, corners[i]), state.color, uvs[i]));
        self.buffer.push(&quad);
    }

    // ── images ─────────────────────────────────────────────────────────────

    /// Most general form: an arbitrary quad (tl, tr, br, bl) showing `frame`
    /// of `source`, or the whole texture when `frame` is `None`.
    pub fn draw_points<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        state: &DrawState,
        source: &impl TextureSource,
        corners: [Vec2; 4],
        frame: Option<Rect>,
        flip: Flip,
    ) {
        let size = source_size(source);
        let frame = frame.unwrap_or(Rect::from_origin_size(Vec2::ZERO, size));
        let uvs = frame_uvs(frame, size, flip);
        self.append(gpu, state, source.texture_id(), corners, uvs);
    }

    pub fn draw_frame<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        state: &DrawState,
        source: &impl TextureSource,
        frame: Rect,
        dest: Rect,
        flip: Flip,
    ) {
        self.draw_points(gpu, state, source, dest.corners(), Some(frame), flip);
    }

    pub fn draw_scaled<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        state: &DrawState,
        source: &impl TextureSource,
        dest: Rect,
        flip: Flip,
    ) {
        self.draw_points(gpu, state, source, dest.corners(), None, flip);
    }

    pub fn draw_image<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        state: &DrawState,
        source: &impl TextureSource,
        at: Vec2,
        flip: Flip,
    ) {
        let dest = Rect::from_origin_size(at, source_size(source));
        self.draw_scaled(gpu, state, source, dest, flip);
    }

    /// Samples a render target. Targets are stored bottom-up, so the full
    /// texture is always read vertically mirrored.
    pub fn draw_target<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        state: &DrawState,
        target: &RenderTarget,
        at: Vec2,
    ) {
        let dest = Rect::from_origin_size(at, source_size(target));
        self.append(gpu, state, target.id(), dest.corners(), FLIP_UVS[Flip::Vertical.index()]);
    }

    // ── text ───────────────────────────────────────────────────────────────

    /// Lays out `text` from the pen position `at` (top of the first line).
    ///
    /// Returns the pen position after the last glyph.
    pub fn draw_text<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        state: &DrawState,
        font: &BitmapFont,
        text: &str,
        at: Vec2,
    ) -> Vec2 {
        let atlas = font.texture();
        let mut pen = at;
        let mut prev: Option<char> = None;

        for ch in text.chars() {
            if ch == '\n' {
                pen.x = at.x;
                pen.y += font.line_height();
                prev = None;
                continue;
            }

            // Unknown characters take no space and do not break kerning pairs.
            let Some(glyph) = font.char_data(ch) else {
                continue;
            };

            if let Some(p) = prev {
                pen.x += font.kerning(p, ch);
            }

            if glyph.width > 0.0 && glyph.height > 0.0 {
                let frame = Rect::new(glyph.x, glyph.y, glyph.width, glyph.height);
                let dest = Rect::new(
                    pen.x + glyph.x_offset,
                    pen.y + glyph.y_offset,
                    glyph.width,
                    glyph.height,
                );
                self.draw_frame(gpu, state, atlas, frame, dest, Flip::None);
            }

            pen.x += glyph.x_advance;
            prev = Some(ch);
        }

        pen
    }
}
