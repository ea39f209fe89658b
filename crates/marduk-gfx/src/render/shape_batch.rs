//! Untextured triangle batch.
//!
//! Every shape decomposes into triangles appended through [`ShapeBatch::append`].
//! Positions are transformed when they are appended, so the model matrix and
//! tint in effect at call time are baked into the vertices.

use std::f32::consts::TAU;

use glam::{Mat4, Vec2};

use super::buffer::{BatchBuffer, Triangle};
use super::error::GeometryError;
use super::gpu::{GpuContext, ShaderKind};
use super::shader::Shader;
use super::state::DrawState;
use super::vertex::{ShapeVertex, transform_point};
use crate::coords::Rect;

/// Which side of the nominal segment a line's width extends to.
///
/// Sides are named for clockwise winding in screen space (+y down), which is
/// the order [`Rect::corners`] and the circle rim use: `Inside` grows toward
/// the interior of such an outline.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum LineAlign {
    Inside,
    #[default]
    Center,
    Outside,
}

fn reject(op: &str, err: GeometryError) {
    log::warn!("{op}: {err}; nothing drawn");
}

fn check_width(width: f32) -> Result<(), GeometryError> {
    if width > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::NonPositiveWidth(width))
    }
}

fn check_circle(radius: f32, segments: u32) -> Result<(), GeometryError> {
    if radius.is_nan() || radius <= 0.0 {
        return Err(GeometryError::NonPositiveRadius(radius));
    }
    if segments < 3 {
        return Err(GeometryError::TooFewSegments(segments));
    }
    Ok(())
}

fn check_polygon(points: &[Vec2]) -> Result<(), GeometryError> {
    if points.len() < 3 {
        Err(GeometryError::TooFewPoints(points.len()))
    } else {
        Ok(())
    }
}

/// Corners of the quad covering a line, in winding order.
fn line_quad(a: Vec2, b: Vec2, width: f32, align: LineAlign) -> Result<[Vec2; 4], GeometryError> {
    check_width(width)?;

    let dir = b - a;
    let len = dir.length();
    if len <= f32::EPSILON {
        return Err(GeometryError::DegenerateLine);
    }

    // Points to the right of travel on screen, i.e. inward for clockwise outlines.
    let normal = dir.perp() / len;
    let (near, far) = match align {
        LineAlign::Inside => (Vec2::ZERO, normal * width),
        LineAlign::Center => (-normal * (width * 0.5), normal * (width * 0.5)),
        LineAlign::Outside => (Vec2::ZERO, -normal * width),
    };

    Ok([a + near, b + near, b + far, a + far])
}

/// Rim of a circle, walked clockwise on screen from angle 0.
///
/// Uses a fixed rotation step instead of per-point trigonometry; the last
/// point is snapped to the first so the outline closes exactly.
fn circle_rim(center: Vec2, radius: f32, segments: u32) -> impl Iterator<Item = (Vec2, Vec2)> {
    let (sin, cos) = (TAU / segments as f32).sin_cos();
    let start = center + Vec2::new(radius, 0.0);

    let mut r = Vec2::new(radius, 0.0);
    let mut prev = start;
    (1..=segments).map(move |i| {
        r = Vec2::new(r.x * cos - r.y * sin, r.x * sin + r.y * cos);
        let next = if i == segments { start } else { center + r };
        let edge = (prev, next);
        prev = next;
        edge
    })
}

pub(crate) struct ShapeBatch {
    buffer: BatchBuffer<ShapeVertex, Triangle>,
    default_shader: Shader,
    shader: Shader,
}

impl ShapeBatch {
    pub fn new<G: GpuContext + ?Sized>(gpu: &mut G, capacity: usize, default_shader: Shader) -> Self {
        Self {
            buffer: BatchBuffer::new(gpu, capacity, "shape batch"),
            default_shader,
            shader: default_shader,
        }
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.buffer.pending()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
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
        self.buffer.discard()
    }

    /// Binds the active shader and issues one draw for everything pending.
    pub fn flush<G: GpuContext + ?Sized>(&mut self, gpu: &mut G, projection: &Mat4) -> usize {
        if self.buffer.is_empty() {
            return 0;
        }
        gpu.use_shader(self.shader.id());
        gpu.set_blend_mode(self.shader.blend());
        gpu.set_projection(projection);
        self.buffer.submit(gpu)
    }

    /// `None` restores the built-in shader. Image shaders are ignored.
    pub fn set_shader<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        projection: &Mat4,
        shader: Option<&Shader>,
    ) {
        let next = match shader {
            None => self.default_shader,
            Some(s) if s.kind() == ShaderKind::Shape => *s,
            Some(s) => {
                log::debug!("ignoring {:?} shader {:?} for the shape batch", s.kind(), s.id());
                return;
            }
        };
        if next == self.shader {
            return;
        }
        self.flush(gpu, projection);
        self.shader = next;
    }

    /// Transforms and writes one triangle, flushing first when full.
    fn append<G: GpuContext + ?Sized>(&mut self, gpu: &mut G, state: &DrawState, tri: [Vec2; 3]) {
        if self.buffer.is_full() {
            self.flush(gpu, &state.projection);
        }
        let m = &state.transform;
        self.buffer
            .push(&tri.map(|p| ShapeVertex::new(transform_point(m, p), state.color)));
    }

    fn append_quad<G: GpuContext + ?Sized>(&mut self, gpu: &mut G, state: &DrawState, q: [Vec2; 4]) {
        self.append(gpu, state, [q[0], q[1], q[2]]);
        self.append(gpu, state, [q[0], q[2], q[3]]);
    }

    // ── primitives ─────────────────────────────────────────────────────────

    pub fn fill_triangle<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        state: &DrawState,
        a: Vec2,
        b: Vec2,
        c: Vec2,
    ) {
        self.append(gpu, state, [a, b, c]);
    }

    pub fn draw_line<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        state: &DrawState,
        a: Vec2,
        b: Vec2,
        width: f32,
        align: LineAlign,
    ) {
        match line_quad(a, b, width, align) {
            Ok(q) => self.append_quad(gpu, state, q),
            Err(e) => reject("draw_line", e),
        }
    }

    pub fn fill_rect<G: GpuContext + ?Sized>(&mut self, gpu: &mut G, state: &DrawState, rect: Rect) {
        let [tl, tr, br, bl] = rect.normalized().corners();
        self.append(gpu, state, [tl, tr, br]);
        self.append(gpu, state, [tl, br, bl]);
    }

    /// Border kept within `rect`.
    pub fn draw_rect<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        state: &DrawState,
        rect: Rect,
        width: f32,
    ) {
        if let Err(e) = check_width(width) {
            return reject("draw_rect", e);
        }
        let c = rect.normalized().corners();
        for i in 0..4 {
            self.draw_line(gpu, state, c[i], c[(i + 1) % 4], width, LineAlign::Inside);
        }
    }

    pub fn fill_circle<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        state: &DrawState,
        center: Vec2,
        radius: f32,
        segments: u32,
    ) {
        if let Err(e) = check_circle(radius, segments) {
            return reject("fill_circle", e);
        }
        for (p, q) in circle_rim(center, radius, segments) {
            self.append(gpu, state, [center, p, q]);
        }
    }

    /// Outline grown outward from the nominal radius.
    pub fn draw_circle<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        state: &DrawState,
        center: Vec2,
        radius: f32,
        segments: u32,
        width: f32,
    ) {
        if let Err(e) = check_circle(radius, segments).and_then(|_| check_width(width)) {
            return reject("draw_circle", e);
        }
        for (p, q) in circle_rim(center, radius, segments) {
            self.draw_line(gpu, state, p, q, width, LineAlign::Outside);
        }
    }

    /// Fan triangulation anchored at the first point; `points` are relative to `origin`.
    pub fn fill_polygon<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        state: &DrawState,
        origin: Vec2,
        points: &[Vec2],
    ) {
        if let Err(e) = check_polygon(points) {
            return reject("fill_polygon", e);
        }
        let first = origin + points[0];
        for pair in points[1..].windows(2) {
            self.append(gpu, state, [first, origin + pair[0], origin + pair[1]]);
        }
    }

    /// Closed outline; `points` are relative to `origin`.
    pub fn draw_polygon<G: GpuContext + ?Sized>(
        &mut self,
        gpu: &mut G,
        state: &DrawState,
        origin: Vec2,
        points: &[Vec2],
        width: f32,
    ) {
        if let Err(e) = check_polygon(points).and_then(|_| check_width(width)) {
            return reject("draw_polygon", e);
        }
        let n = points.len();
        for i in 0..n {
            let a = origin + points[i];
            let b = origin + points[(i + 1) % n];
            self.draw_line(gpu, state, a, b, width, LineAlign::Inside);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::{BlendMode, Color};
    use crate::render::gpu::ShaderId;
    use crate::render::testing::RecordingGpu;

    const EPS: f32 = 1e-4;

    fn batch(gpu: &mut RecordingGpu, capacity: usize) -> ShapeBatch {
        let shader = Shader::new(ShaderId::new(100), ShaderKind::Shape);
        ShapeBatch::new(gpu, capacity, shader)
    }

    fn state(color: Color) -> DrawState {
        DrawState {
            transform: Mat4::IDENTITY,
            color,
            projection: Mat4::IDENTITY,
        }
    }

    fn positions(vertices: &[f32]) -> Vec<Vec2> {
        vertices
            .chunks_exact(ShapeVertex::STRIDE)
            .map(|v| Vec2::new(v[0], v[1]))
            .collect()
    }

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn capacity_two_three_triangles_flushes_twice() {
        let mut gpu = RecordingGpu::new(100, 100);
        let mut b = batch(&mut gpu, 2);
        let colors = [Color::rgb(1.0, 0.0, 0.0), Color::rgb(0.0, 1.0, 0.0), Color::rgb(0.0, 0.0, 1.0)];

        for c in colors {
            b.fill_triangle(&mut gpu, &state(c), Vec2::ZERO, Vec2::X, Vec2::Y);
        }
        b.flush(&mut gpu, &Mat4::IDENTITY);

        let draws = gpu.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].index_count, 6);
        assert_eq!(draws[1].index_count, 3);
        assert_eq!(draws[1].vertices.len(), 3 * ShapeVertex::STRIDE);
        for v in draws[1].vertices.chunks_exact(ShapeVertex::STRIDE) {
            assert_eq!(&v[3..7], &colors[2].to_array());
        }
    }

    #[test]
    fn flush_count_is_ceil_of_n_over_capacity() {
        for (n, cap) in [(1usize, 4usize), (4, 4), (5, 4), (17, 3), (64, 8)] {
            let mut gpu = RecordingGpu::new(10, 10);
            let mut b = batch(&mut gpu, cap);
            for _ in 0..n {
                b.fill_triangle(&mut gpu, &state(Color::WHITE), Vec2::ZERO, Vec2::X, Vec2::Y);
            }
            b.flush(&mut gpu, &Mat4::IDENTITY);
            assert_eq!(gpu.draws().len(), n.div_ceil(cap), "n={n} cap={cap}");
        }
    }

    #[test]
    fn capacity_boundary_flushes_on_next_append() {
        let mut gpu = RecordingGpu::new(10, 10);
        let mut b = batch(&mut gpu, 3);
        for _ in 0..3 {
            b.fill_triangle(&mut gpu, &state(Color::WHITE), Vec2::ZERO, Vec2::X, Vec2::Y);
        }
        assert!(gpu.draws().is_empty());
        assert_eq!(b.pending(), 3);

        b.fill_triangle(&mut gpu, &state(Color::WHITE), Vec2::ZERO, Vec2::X, Vec2::Y);
        assert_eq!(gpu.draws().len(), 1);
        assert_eq!(b.pending(), 1);
    }

    #[test]
    fn transform_is_applied_at_append_time() {
        let mut gpu = RecordingGpu::new(10, 10);
        let mut b = batch(&mut gpu, 4);
        let mut s = state(Color::WHITE);
        s.transform = Mat4::from_translation(glam::Vec3::new(5.0, 7.0, 0.0));

        b.fill_triangle(&mut gpu, &s, Vec2::ZERO, Vec2::X, Vec2::Y);
        b.flush(&mut gpu, &Mat4::IDENTITY);

        let p = positions(&gpu.draws()[0].vertices);
        assert_eq!(p, vec![Vec2::new(5.0, 7.0), Vec2::new(6.0, 7.0), Vec2::new(5.0, 8.0)]);
    }

    #[test]
    fn degenerate_inputs_emit_nothing() {
        let mut gpu = RecordingGpu::new(10, 10);
        let mut b = batch(&mut gpu, 16);
        let s = state(Color::WHITE);

        b.fill_circle(&mut gpu, &s, Vec2::ZERO, 0.0, 8);
        b.fill_circle(&mut gpu, &s, Vec2::ZERO, 5.0, 2);
        b.draw_circle(&mut gpu, &s, Vec2::ZERO, 5.0, 8, 0.0);
        b.draw_polygon(&mut gpu, &s, Vec2::ZERO, &[Vec2::ZERO, Vec2::X], 1.0);
        b.fill_polygon(&mut gpu, &s, Vec2::ZERO, &[Vec2::ZERO, Vec2::X]);
        b.draw_line(&mut gpu, &s, Vec2::ONE, Vec2::ONE, 2.0, LineAlign::Center);
        b.draw_line(&mut gpu, &s, Vec2::ZERO, Vec2::X, -1.0, LineAlign::Center);
        b.draw_rect(&mut gpu, &s, Rect::new(0.0, 0.0, 4.0, 4.0), 0.0);

        assert_eq!(b.pending(), 0);
    }

    #[test]
    fn line_alignment_offsets() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);

        let center = line_quad(a, b, 2.0, LineAlign::Center).unwrap();
        assert_eq!(center[0], Vec2::new(0.0, -1.0));
        assert_eq!(center[2], Vec2::new(10.0, 1.0));

        let inside = line_quad(a, b, 2.0, LineAlign::Inside).unwrap();
        assert_eq!(inside, [a, b, Vec2::new(10.0, 2.0), Vec2::new(0.0, 2.0)]);

        let outside = line_quad(a, b, 2.0, LineAlign::Outside).unwrap();
        assert_eq!(outside[3], Vec2::new(0.0, -2.0));
    }

    #[test]
    fn draw_rect_stays_within_bounds() {
        let mut gpu = RecordingGpu::new(10, 10);
        let mut b = batch(&mut gpu, 64);
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);

        b.draw_rect(&mut gpu, &state(Color::WHITE), rect, 3.0);
        assert_eq!(b.pending(), 8);
        b.flush(&mut gpu, &Mat4::IDENTITY);

        for p in positions(&gpu.draws()[0].vertices) {
            assert!(p.x >= 10.0 - EPS && p.x <= 40.0 + EPS, "{p}");
            assert!(p.y >= 20.0 - EPS && p.y <= 60.0 + EPS, "{p}");
        }
    }

    #[test]
    fn fill_circle_rim_closes_on_start() {
        let mut gpu = RecordingGpu::new(10, 10);
        let mut b = batch(&mut gpu, 64);
        let center = Vec2::new(50.0, 50.0);

        b.fill_circle(&mut gpu, &state(Color::WHITE), center, 10.0, 12);
        assert_eq!(b.pending(), 12);
        b.flush(&mut gpu, &Mat4::IDENTITY);

        let p = positions(&gpu.draws()[0].vertices);
        let first_rim = p[1];
        let last_rim = p[p.len() - 1];
        assert_eq!(first_rim, last_rim);
        for tri in p.chunks(3) {
            assert_eq!(tri[0], center);
            assert!(((tri[1] - center).length() - 10.0).abs() < EPS);
            assert!(((tri[2] - center).length() - 10.0).abs() < EPS);
        }
    }

    #[test]
    fn draw_circle_grows_outward() {
        let mut gpu = RecordingGpu::new(10, 10);
        let mut b = batch(&mut gpu, 256);
        b.draw_circle(&mut gpu, &state(Color::WHITE), Vec2::ZERO, 10.0, 16, 2.0);
        assert_eq!(b.pending(), 32);
        b.flush(&mut gpu, &Mat4::IDENTITY);

        for p in positions(&gpu.draws()[0].vertices) {
            assert!(p.length() >= 10.0 * (std::f32::consts::PI / 16.0).cos() - EPS);
            assert!(p.length() <= 12.0 + EPS);
        }
    }

    #[test]
    fn fill_polygon_fans_from_first_point() {
        let mut gpu = RecordingGpu::new(10, 10);
        let mut b = batch(&mut gpu, 16);
        let origin = Vec2::new(100.0, 0.0);
        let pts = [Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0), Vec2::new(0.0, 10.0)];

        b.fill_polygon(&mut gpu, &state(Color::WHITE), origin, &pts);
        assert_eq!(b.pending(), 2);
        b.flush(&mut gpu, &Mat4::IDENTITY);

        let p = positions(&gpu.draws()[0].vertices);
        assert!(approx(p[0], origin));
        assert!(approx(p[3], origin));
        assert!(approx(p[5], origin + pts[3]));
    }

    #[test]
    fn draw_polygon_closes_loop() {
        let mut gpu = RecordingGpu::new(10, 10);
        let mut b = batch(&mut gpu, 16);
        let pts = [Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(5.0, 8.0)];
        b.draw_polygon(&mut gpu, &state(Color::WHITE), Vec2::ZERO, &pts, 1.0);
        assert_eq!(b.pending(), 6);
    }

    #[test]
    fn mismatched_shader_is_ignored() {
        let mut gpu = RecordingGpu::new(10, 10);
        let mut b = batch(&mut gpu, 4);
        let image = Shader::new(ShaderId::new(7), ShaderKind::Image);

        b.set_shader(&mut gpu, &Mat4::IDENTITY, Some(&image));
        assert_eq!(b.shader().id(), ShaderId::new(100));
    }

    #[test]
    fn shader_switch_flushes_and_none_restores_default() {
        let mut gpu = RecordingGpu::new(10, 10);
        let mut b = batch(&mut gpu, 4);
        let custom = Shader::new(ShaderId::new(8), ShaderKind::Shape).with_blend(BlendMode::Additive);
        let s = state(Color::WHITE);

        b.fill_triangle(&mut gpu, &s, Vec2::ZERO, Vec2::X, Vec2::Y);
        b.set_shader(&mut gpu, &Mat4::IDENTITY, Some(&custom));
        b.fill_triangle(&mut gpu, &s, Vec2::ZERO, Vec2::X, Vec2::Y);
        b.set_shader(&mut gpu, &Mat4::IDENTITY, None);

        let draws = gpu.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].shader, Some(ShaderId::new(100)));
        assert_eq!(draws[1].shader, Some(ShaderId::new(8)));
        assert_eq!(draws[1].blend, BlendMode::Additive);
        assert_eq!(b.shader().id(), ShaderId::new(100));
    }

    #[test]
    fn same_shader_does_not_flush() {
        let mut gpu = RecordingGpu::new(10, 10);
        let mut b = batch(&mut gpu, 4);
        b.fill_triangle(&mut gpu, &state(Color::WHITE), Vec2::ZERO, Vec2::X, Vec2::Y);
        b.set_shader(&mut gpu, &Mat4::IDENTITY, None);
        assert!(gpu.draws().is_empty());
        assert_eq!(b.pending(), 1);
    }
}
