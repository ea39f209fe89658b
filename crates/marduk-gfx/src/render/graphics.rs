//! Drawing facade.
//!
//! [`Graphics`] owns both batches plus the transform and render-target stacks
//! and is the only entry point application code draws through. Its one hard
//! rule: shape and image geometry never interleave inside a draw call. Every
//! shape call flushes pending images first and every image call flushes
//! pending shapes first, so submission order always matches call order.

use glam::{Mat4, Vec2, Vec3};

use crate::coords::{Rect, Viewport};
use crate::paint::Color;

use super::error::GraphicsError;
use super::font::BitmapFont;
use super::gpu::{GpuContext, ShaderKind};
use super::image_batch::{Flip, ImageBatch};
use super::shader::Shader;
use super::shape_batch::{LineAlign, ShapeBatch};
use super::state::{DrawState, RenderState};
use super::target::TargetStack;
use super::texture::{RenderTarget, Texture, TextureSource};

/// Built-in shape shader source. Custom shape shaders must keep its vertex
/// inputs and the group 0 projection binding.
pub const SHAPE_WGSL: &str = include_str!("shaders/shape.wgsl");
/// Built-in image shader source.
pub const IMAGE_WGSL: &str = include_str!("shaders/image.wgsl");

/// Renderer sizing and defaults.
#[derive(Debug, Clone)]
pub struct GraphicsConfig {
    /// Triangles per shape batch.
    pub shape_capacity: usize,
    /// Quads per image batch.
    pub image_capacity: usize,
    /// Transform stack ceiling, base frame included.
    pub max_transform_depth: usize,
    pub max_target_depth: usize,
    /// Used by [`Clear::Default`].
    pub clear_color: Color,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            shape_capacity: 4096,
            image_capacity: 2048,
            max_transform_depth: 64,
            max_target_depth: 16,
            clear_color: Color::BLACK,
        }
    }
}

/// What [`Graphics::start`] does with the current target's contents.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum Clear {
    Keep,
    #[default]
    Default,
    Color(Color),
}

/// Submission counters since the last [`Graphics::start`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub shape_flushes: u32,
    pub image_flushes: u32,
    pub triangles: u32,
    pub quads: u32,
}

pub struct Graphics<G: GpuContext> {
    gpu: G,
    config: GraphicsConfig,
    state: RenderState,
    targets: TargetStack,
    shapes: ShapeBatch,
    images: ImageBatch,
}

impl<G: GpuContext> Graphics<G> {
    /// Builds both batches on `gpu` and compiles the built-in shaders.
    pub fn new(mut gpu: G, config: GraphicsConfig) -> Result<Self, GraphicsError> {
        let shape_shader = Shader::new(
            gpu.create_shader(ShaderKind::Shape, "builtin shape", SHAPE_WGSL)?,
            ShaderKind::Shape,
        );
        let image_shader = Shader::new(
            gpu.create_shader(ShaderKind::Image, "builtin image", IMAGE_WGSL)?,
            ShaderKind::Image,
        );

        let shapes = ShapeBatch::new(&mut gpu, config.shape_capacity, shape_shader);
        let images = ImageBatch::new(&mut gpu, config.image_capacity, image_shader);

        log::debug!(
            "graphics ready: {} triangles / {} quads per batch",
            shapes.capacity(),
            config.image_capacity.max(1)
        );

        Ok(Self {
            state: RenderState::new(config.max_transform_depth),
            targets: TargetStack::new(config.max_target_depth),
            gpu,
            config,
            shapes,
            images,
        })
    }

    #[inline]
    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    #[inline]
    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    #[inline]
    pub fn config(&self) -> &GraphicsConfig {
        &self.config
    }

    // ── frame ──────────────────────────────────────────────────────────────

    /// Begins a frame on the current target.
    ///
    /// Geometry still pending from an unfinished frame is dropped, never drawn.
    pub fn start(&mut self, clear: Clear) {
        let dropped = self.shapes.discard() + self.images.discard();
        if dropped > 0 {
            log::debug!("start: discarded {dropped} pending primitive(s)");
        }
        self.shapes.reset_stats();
        self.images.reset_stats();

        self.bind_current_target();
        match clear {
            Clear::Keep => {}
            Clear::Default => self.gpu.clear(self.config.clear_color),
            Clear::Color(c) => self.gpu.clear(c),
        }
    }

    /// Flushes both batches.
    pub fn flush(&mut self) {
        let projection = self.state.projection;
        self.shapes.flush(&mut self.gpu, &projection);
        self.images.flush(&mut self.gpu, &projection);
    }

    /// Ends the frame. Nothing stays pending afterwards.
    pub fn end(&mut self) {
        self.flush();
    }

    pub fn stats(&self) -> FrameStats {
        let (shape_flushes, triangles) = self.shapes.stats();
        let (image_flushes, quads) = self.images.stats();
        FrameStats {
            draw_calls: shape_flushes + image_flushes,
            shape_flushes,
            image_flushes,
            triangles,
            quads,
        }
    }

    /// Projection for the current target.
    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.state.projection
    }

    fn bind_current_target(&mut self) {
        let target = self.targets.current().copied();
        self.gpu.bind_render_target(target.map(|t| t.id()));

        self.state.projection = match target {
            Some(t) => Viewport::new(t.width() as f32, t.height() as f32).target_projection(),
            None => {
                let (w, h) = self.gpu.surface_size();
                Viewport::new(w as f32, h as f32).projection()
            }
        };
    }

    fn begin_shapes(&mut self) -> DrawState {
        self.images.flush(&mut self.gpu, &self.state.projection);
        self.state.draw_state()
    }

    fn begin_images(&mut self) -> DrawState {
        self.shapes.flush(&mut self.gpu, &self.state.projection);
        self.state.draw_state()
    }

    // ── tint ───────────────────────────────────────────────────────────────

    /// Tint baked into every vertex appended from now on.
    pub fn set_color(&mut self, color: Color) {
        self.state.color = color;
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.state.color
    }

    // ── transforms ─────────────────────────────────────────────────────────

    pub fn push_transform(&mut self) -> Result<(), GraphicsError> {
        self.state.transforms.push()
    }

    /// Pushes a new frame composed of the current one and `m`.
    pub fn push_transform_with(&mut self, m: Mat4) -> Result<(), GraphicsError> {
        self.state.transforms.push_with(m)
    }

    pub fn pop_transform(&mut self) -> Result<Mat4, GraphicsError> {
        self.state.transforms.pop()
    }

    pub fn apply_transform(&mut self, m: Mat4) {
        self.state.transforms.apply(m);
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.apply_transform(Mat4::from_translation(Vec3::new(x, y, 0.0)));
    }

    /// Rotates clockwise on screen (+y down).
    pub fn rotate(&mut self, radians: f32) {
        self.apply_transform(Mat4::from_rotation_z(radians));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.apply_transform(Mat4::from_scale(Vec3::new(sx, sy, 1.0)));
    }

    #[inline]
    pub fn transform(&self) -> Mat4 {
        self.state.transforms.top()
    }

    #[inline]
    pub fn transform_depth(&self) -> usize {
        self.state.transforms.depth()
    }

    /// Runs `f` inside a frame composed with `m`, popped when `f` returns.
    pub fn with_transform<R>(
        &mut self,
        m: Mat4,
        f: impl FnOnce(&mut Self) -> R,
    ) -> Result<R, GraphicsError> {
        self.push_transform_with(m)?;
        let out = f(self);
        self.pop_transform()?;
        Ok(out)
    }

    // ── render targets ─────────────────────────────────────────────────────

    /// Redirects drawing into `target` until the matching [`pop_target`](Self::pop_target).
    pub fn push_target(&mut self, target: &RenderTarget) -> Result<(), GraphicsError> {
        self.flush();
        self.targets.push(*target)?;
        self.bind_current_target();
        Ok(())
    }

    pub fn pop_target(&mut self) -> Result<RenderTarget, GraphicsError> {
        self.flush();
        let popped = self.targets.pop()?;
        self.bind_current_target();
        Ok(popped)
    }

    /// Returns to the backbuffer.
    pub fn clear_targets(&mut self) {
        self.flush();
        self.targets.clear();
        self.bind_current_target();
    }

    #[inline]
    pub fn current_target(&self) -> Option<&RenderTarget> {
        self.targets.current()
    }

    // ── shaders ────────────────────────────────────────────────────────────

    pub fn create_shader(
        &mut self,
        kind: ShaderKind,
        label: &str,
        wgsl: &str,
    ) -> Result<Shader, GraphicsError> {
        let id = self.gpu.create_shader(kind, label, wgsl)?;
        log::debug!("created {kind:?} shader '{label}' ({id:?})");
        Ok(Shader::new(id, kind))
    }

    /// Binds `shader` for shapes; `None` restores the built-in one.
    ///
    /// An image shader is ignored and the current shape shader stays bound.
    pub fn set_shape_shader(&mut self, shader: Option<&Shader>) {
        self.shapes
            .set_shader(&mut self.gpu, &self.state.projection, shader);
    }

    /// Binds `shader` for images; `None` restores the built-in one.
    ///
    /// A shape shader is ignored and the current image shader stays bound.
    pub fn set_image_shader(&mut self, shader: Option<&Shader>) {
        self.images
            .set_shader(&mut self.gpu, &self.state.projection, shader);
    }

    pub fn shape_shader(&self) -> &Shader {
        self.shapes.shader()
    }

    pub fn image_shader(&self) -> &Shader {
        self.images.shader()
    }

    /// Built-in shaders are owned by the renderer and are never destroyed.
    pub fn destroy_shader(&mut self, shader: Shader) {
        let id = shader.id();
        if id == self.shapes.default_shader().id() || id == self.images.default_shader().id() {
            log::debug!("refusing to destroy built-in shader {id:?}");
            return;
        }
        if self.shapes.shader().id() == id {
            self.set_shape_shader(None);
        }
        if self.images.shader().id() == id {
            self.set_image_shader(None);
        }
        self.gpu.destroy_shader(id);
        log::debug!("destroyed shader {id:?}");
    }

    // ── resources ──────────────────────────────────────────────────────────

    /// Uploads tightly packed RGBA8 pixels (`width * height * 4` bytes).
    pub fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<Texture, GraphicsError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(GraphicsError::InvalidTexture {
                width,
                height,
                len: rgba.len(),
            });
        }
        let id = self.gpu.create_texture(width, height, rgba)?;
        log::debug!("created {width}x{height} texture {id:?}");
        Ok(Texture::new(id, width, height))
    }

    /// Pending quads sampling `texture` are drawn before it goes away.
    pub fn destroy_texture(&mut self, texture: Texture) {
        if self.images.bound_texture() == Some(texture.id()) {
            self.images.flush(&mut self.gpu, &self.state.projection);
        }
        self.gpu.destroy_texture(texture.id());
        log::debug!("destroyed texture {:?}", texture.id());
    }

    pub fn create_render_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<RenderTarget, GraphicsError> {
        if width == 0 || height == 0 {
            return Err(GraphicsError::InvalidTexture {
                width,
                height,
                len: 0,
            });
        }
        let id = self.gpu.create_render_target(width, height)?;
        log::debug!("created {width}x{height} render target {id:?}");
        Ok(RenderTarget::new(id, width, height))
    }

    /// Fails with [`GraphicsError::TargetInUse`] while `target` is on the target stack.
    pub fn destroy_render_target(&mut self, target: RenderTarget) -> Result<(), GraphicsError> {
        if self.targets.contains(&target) {
            return Err(GraphicsError::TargetInUse);
        }
        if self.images.bound_texture() == Some(target.id()) {
            self.images.flush(&mut self.gpu, &self.state.projection);
        }
        self.gpu.destroy_texture(target.id());
        log::debug!("destroyed render target {:?}", target.id());
        Ok(())
    }

    // ── shapes ─────────────────────────────────────────────────────────────

    pub fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2) {
        let st = self.begin_shapes();
        self.shapes.fill_triangle(&mut self.gpu, &st, a, b, c);
    }

    pub fn draw_line(&mut self, a: Vec2, b: Vec2, width: f32, align: LineAlign) {
        let st = self.begin_shapes();
        self.shapes.draw_line(&mut self.gpu, &st, a, b, width, align);
    }

    pub fn fill_rect(&mut self, rect: Rect) {
        let st = self.begin_shapes();
        self.shapes.fill_rect(&mut self.gpu, &st, rect);
    }

    pub fn draw_rect(&mut self, rect: Rect, width: f32) {
        let st = self.begin_shapes();
        self.shapes.draw_rect(&mut self.gpu, &st, rect, width);
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, segments: u32) {
        let st = self.begin_shapes();
        self.shapes
            .fill_circle(&mut self.gpu, &st, center, radius, segments);
    }

    pub fn draw_circle(&mut self, center: Vec2, radius: f32, segments: u32, width: f32) {
        let st = self.begin_shapes();
        self.shapes
            .draw_circle(&mut self.gpu, &st, center, radius, segments, width);
    }

    pub fn fill_polygon(&mut self, origin: Vec2, points: &[Vec2]) {
        let st = self.begin_shapes();
        self.shapes.fill_polygon(&mut self.gpu, &st, origin, points);
    }

    pub fn draw_polygon(&mut self, origin: Vec2, points: &[Vec2], width: f32) {
        let st = self.begin_shapes();
        self.shapes
            .draw_polygon(&mut self.gpu, &st, origin, points, width);
    }

    // ── images ─────────────────────────────────────────────────────────────

    pub fn draw_image(&mut self, texture: &Texture, x: f32, y: f32, flip: Flip) {
        let st = self.begin_images();
        self.images
            .draw_image(&mut self.gpu, &st, texture, Vec2::new(x, y), flip);
    }

    pub fn draw_image_scaled(
        &mut self,
        texture: &Texture,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        flip: Flip,
    ) {
        let st = self.begin_images();
        self.images
            .draw_scaled(&mut self.gpu, &st, texture, Rect::new(x, y, w, h), flip);
    }

    /// Draws the `frame` region (texture pixels) of `texture` into `x, y, w, h`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image_frame(
        &mut self,
        texture: &Texture,
        frame: Rect,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        flip: Flip,
    ) {
        let st = self.begin_images();
        self.images.draw_frame(
            &mut self.gpu,
            &st,
            texture,
            frame,
            Rect::new(x, y, w, h),
            flip,
        );
    }

    /// Draws onto an arbitrary quad given as (tl, tr, br, bl).
    pub fn draw_image_points(
        &mut self,
        texture: &Texture,
        corners: [Vec2; 4],
        frame: Option<Rect>,
        flip: Flip,
    ) {
        let st = self.begin_images();
        self.images
            .draw_points(&mut self.gpu, &st, texture, corners, frame, flip);
    }

    /// Samples `target` as an image. Skipped while `target` is being drawn into.
    pub fn draw_render_target(&mut self, target: &RenderTarget, x: f32, y: f32) {
        if self.targets.contains(target) {
            log::warn!("draw_render_target: {:?} is on the target stack; nothing drawn", target.id());
            return;
        }
        let st = self.begin_images();
        self.images
            .draw_target(&mut self.gpu, &st, target, Vec2::new(x, y));
    }

    /// Draws `text` with its first line's top-left at `x, y`. Returns the
    /// pen position after the last glyph.
    pub fn draw_text(&mut self, font: &BitmapFont, text: &str, x: f32, y: f32) -> Vec2 {
        let st = self.begin_images();
        self.images
            .draw_text(&mut self.gpu, &st, font, text, Vec2::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::font::CharData;
    use crate::render::testing::{GpuCall, RecordingGpu};

    fn graphics(config: GraphicsConfig) -> Graphics<RecordingGpu> {
        let mut g = Graphics::new(RecordingGpu::new(200, 100), config).unwrap();
        g.start(Clear::Keep);
        g
    }

    fn white(g: &mut Graphics<RecordingGpu>) -> Texture {
        g.create_texture(2, 2, &[255; 16]).unwrap()
    }

    fn tri(g: &mut Graphics<RecordingGpu>) {
        g.fill_triangle(Vec2::ZERO, Vec2::X, Vec2::Y);
    }

    #[test]
    fn config_defaults() {
        let c = GraphicsConfig::default();
        assert_eq!(c.shape_capacity, 4096);
        assert_eq!(c.image_capacity, 2048);
        assert_eq!(c.max_transform_depth, 64);
        assert_eq!(c.max_target_depth, 16);
        assert_eq!(c.clear_color, Color::BLACK);
    }

    #[test]
    fn shader_compile_failure_is_fatal() {
        let mut gpu = RecordingGpu::new(10, 10);
        gpu.fail_shaders = Some("bad".into());
        let err = Graphics::new(gpu, GraphicsConfig::default()).err();
        assert!(matches!(err, Some(GraphicsError::ShaderCompile { .. })));
    }

    #[test]
    fn interleaved_shape_image_shape_flushes_in_order() {
        let mut g = graphics(GraphicsConfig::default());
        let tex = white(&mut g);

        tri(&mut g);
        g.draw_image(&tex, 0.0, 0.0, Flip::None);
        tri(&mut g);
        g.end();

        let shape = g.shape_shader().id();
        let image = g.image_shader().id();
        let draws = g.gpu().draws();
        assert_eq!(draws.len(), 3);
        assert_eq!(draws[0].shader, Some(shape));
        assert_eq!(draws[0].index_count, 3);
        assert_eq!(draws[1].shader, Some(image));
        assert_eq!(draws[1].texture, Some(tex.id()));
        assert_eq!(draws[2].shader, Some(shape));
        assert_eq!(draws[2].index_count, 3);
    }

    #[test]
    fn three_triangles_with_capacity_two() {
        let mut g = graphics(GraphicsConfig {
            shape_capacity: 2,
            ..Default::default()
        });
        let colors = [Color::rgb(1.0, 0.0, 0.0), Color::rgb(0.0, 1.0, 0.0), Color::rgb(0.0, 0.0, 1.0)];
        for c in colors {
            g.set_color(c);
            tri(&mut g);
        }
        g.end();

        let draws = g.gpu().draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[1].vertices.len(), 21);
        for v in draws[1].vertex_chunks(7) {
            assert_eq!(&v[3..7], &colors[2].to_array());
        }
        assert_eq!(
            g.stats(),
            FrameStats {
                draw_calls: 2,
                shape_flushes: 2,
                image_flushes: 0,
                triangles: 3,
                quads: 0
            }
        );
    }

    #[test]
    fn tint_changes_do_not_touch_batched_vertices() {
        let mut g = graphics(GraphicsConfig::default());
        g.set_color(Color::rgb(1.0, 0.0, 0.0));
        tri(&mut g);
        g.set_color(Color::rgb(0.0, 0.0, 1.0));
        tri(&mut g);
        g.end();

        let draws = g.gpu().draws();
        assert_eq!(draws.len(), 1);
        let chunks = draws[0].vertex_chunks(7);
        assert_eq!(chunks[0][3], 1.0);
        assert_eq!(chunks[3][5], 1.0);
    }

    #[test]
    fn start_discards_unfinished_geometry() {
        let mut g = graphics(GraphicsConfig::default());
        tri(&mut g);
        g.start(Clear::Default);
        g.end();

        assert!(g.gpu().draws().is_empty());
        assert_eq!(g.stats(), FrameStats::default());
        assert_eq!(g.gpu().calls.last(), Some(&GpuCall::Clear(Color::BLACK)));
    }

    #[test]
    fn start_uses_surface_projection() {
        let g = graphics(GraphicsConfig::default());
        assert_eq!(g.projection(), Viewport::new(200.0, 100.0).projection());
    }

    #[test]
    fn with_transform_restores_previous_frame() {
        let mut g = graphics(GraphicsConfig::default());
        g.translate(5.0, 0.0);
        let before = g.transform();

        let depth = g
            .with_transform(Mat4::from_scale(Vec3::splat(2.0)), |g| {
                tri(g);
                g.transform_depth()
            })
            .unwrap();

        assert_eq!(depth, 2);
        assert_eq!(g.transform(), before);
        g.end();
        let v = g.gpu().draws()[0].vertex_chunks(7)[1].to_vec();
        assert_eq!(&v[0..2], &[7.0, 0.0]);
    }

    #[test]
    fn transform_stack_limits_are_errors() {
        let mut g = graphics(GraphicsConfig {
            max_transform_depth: 2,
            ..Default::default()
        });
        assert_eq!(g.pop_transform(), Err(GraphicsError::TransformUnderflow));
        g.push_transform().unwrap();
        assert_eq!(
            g.push_transform(),
            Err(GraphicsError::TransformOverflow { max: 2 })
        );
    }

    #[test]
    fn target_switch_flushes_and_rebinds() {
        let mut g = graphics(GraphicsConfig::default());
        let target = g.create_render_target(64, 32).unwrap();

        tri(&mut g);
        g.push_target(&target).unwrap();
        assert_eq!(g.gpu().draws().len(), 1);
        assert_eq!(g.gpu().draws()[0].target, None);
        assert_eq!(g.projection(), Viewport::new(64.0, 32.0).target_projection());

        tri(&mut g);
        assert_eq!(g.pop_target().unwrap(), target);
        let draws = g.gpu().draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[1].target, Some(target.id()));
        assert_eq!(draws[1].projection, Some(Viewport::new(64.0, 32.0).target_projection()));
        assert_eq!(g.current_target(), None);
        assert_eq!(g.pop_target(), Err(GraphicsError::TargetUnderflow));
    }

    #[test]
    fn target_stack_depth_is_bounded() {
        let mut g = graphics(GraphicsConfig {
            max_target_depth: 1,
            ..Default::default()
        });
        let a = g.create_render_target(8, 8).unwrap();
        let b = g.create_render_target(8, 8).unwrap();
        g.push_target(&a).unwrap();
        assert_eq!(g.push_target(&b), Err(GraphicsError::TargetOverflow { max: 1 }));
        g.clear_targets();
        assert_eq!(g.current_target(), None);
    }

    #[test]
    fn render_target_cannot_sample_itself() {
        let mut g = graphics(GraphicsConfig::default());
        let target = g.create_render_target(16, 16).unwrap();
        g.push_target(&target).unwrap();
        g.draw_render_target(&target, 0.0, 0.0);
        g.pop_target().unwrap();
        g.draw_render_target(&target, 0.0, 0.0);
        g.end();

        let draws = g.gpu().draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].texture, Some(target.id()));
        assert_eq!(draws[0].target, None);
    }

    #[test]
    fn destroying_bound_texture_flushes_first() {
        let mut g = graphics(GraphicsConfig::default());
        let tex = white(&mut g);
        g.draw_image(&tex, 0.0, 0.0, Flip::None);
        g.destroy_texture(tex);

        let calls = &g.gpu().calls;
        let draw = calls.iter().position(|c| matches!(c, GpuCall::Draw(_)));
        let destroy = calls
            .iter()
            .position(|c| *c == GpuCall::DestroyTexture(tex.id()));
        assert!(draw.unwrap() < destroy.unwrap());
        assert!(!g.gpu().texture_alive(tex.id()));
    }

    #[test]
    fn destroying_target_in_use_is_an_error() {
        let mut g = graphics(GraphicsConfig::default());
        let target = g.create_render_target(8, 8).unwrap();
        g.push_target(&target).unwrap();
        assert_eq!(g.destroy_render_target(target), Err(GraphicsError::TargetInUse));
        g.pop_target().unwrap();
        assert_eq!(g.destroy_render_target(target), Ok(()));
    }

    #[test]
    fn texture_data_must_match_size() {
        let mut g = graphics(GraphicsConfig::default());
        assert_eq!(
            g.create_texture(2, 2, &[0; 15]),
            Err(GraphicsError::InvalidTexture {
                width: 2,
                height: 2,
                len: 15
            })
        );
        assert!(g.create_render_target(0, 4).is_err());
    }

    #[test]
    fn wrong_kind_shader_keeps_previous() {
        let mut g = graphics(GraphicsConfig::default());
        let image = g.create_shader(ShaderKind::Image, "tinted", "").unwrap();
        let before = *g.shape_shader();

        g.set_shape_shader(Some(&image));
        assert_eq!(*g.shape_shader(), before);

        g.set_image_shader(Some(&image));
        assert_eq!(*g.image_shader(), image);
    }

    #[test]
    fn destroying_active_shader_restores_builtin() {
        let mut g = graphics(GraphicsConfig::default());
        let builtin = *g.shape_shader();
        let custom = g.create_shader(ShaderKind::Shape, "custom", "").unwrap();

        g.set_shape_shader(Some(&custom));
        tri(&mut g);
        g.destroy_shader(custom);

        assert_eq!(*g.shape_shader(), builtin);
        assert_eq!(g.gpu().draws()[0].shader, Some(custom.id()));
        assert_eq!(g.gpu().shader_kind(custom.id()), None);

        g.destroy_shader(builtin);
        assert_eq!(g.gpu().shader_kind(builtin.id()), Some(ShaderKind::Shape));
    }

    #[test]
    fn text_runs_share_one_draw_with_images_on_the_atlas() {
        let mut g = graphics(GraphicsConfig::default());
        let atlas = g.create_texture(1, 1, &[255; 4]).unwrap();
        let font = BitmapFont::new(atlas, 10.0).with_glyph(
            'x',
            CharData {
                width: 1.0,
                height: 1.0,
                x_advance: 6.0,
                ..Default::default()
            },
        );

        let pen = g.draw_text(&font, "xxx", 0.0, 0.0);
        g.draw_image(&atlas, 0.0, 0.0, Flip::None);
        g.end();

        assert_eq!(pen, Vec2::new(18.0, 0.0));
        assert_eq!(g.gpu().draws().len(), 1);
        assert_eq!(g.stats().quads, 4);
        assert_eq!(g.gpu().draws()[0].texture, Some(atlas.id()));
    }
}
