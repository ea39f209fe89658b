use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec4};

use crate::paint::Color;

// ── shape vertex ──────────────────────────────────────────────────────────

/// Untextured vertex (stride: 7 floats).
///
///  offset  0  position  [f32; 3]   loc 0
///  offset 12  color     [f32; 4]   loc 1
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ShapeVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl ShapeVertex {
    pub const STRIDE: usize = 7;

    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x4  // color
    ];

    #[inline]
    pub fn new(position: [f32; 3], color: Color) -> Self {
        Self {
            position,
            color: color.to_array(),
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ShapeVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// ── image vertex ──────────────────────────────────────────────────────────

/// Textured vertex (stride: 9 floats).
///
///  offset  0  position  [f32; 3]   loc 0
///  offset 12  color     [f32; 4]   loc 1
///  offset 28  uv        [f32; 2]   loc 2
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ImageVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

impl ImageVertex {
    pub const STRIDE: usize = 9;

    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x4, // color
        2 => Float32x2  // uv
    ];

    #[inline]
    pub fn new(position: [f32; 3], color: Color, uv: Vec2) -> Self {
        Self {
            position,
            color: color.to_array(),
            uv: uv.to_array(),
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ImageVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// ── transform ─────────────────────────────────────────────────────────────

/// Applies `m` to a 2D point with a homogeneous divide.
///
/// A zero `w` is treated as 1 so degenerate matrices never produce NaNs.
#[inline]
pub(crate) fn transform_point(m: &Mat4, p: Vec2) -> [f32; 3] {
    let v = *m * Vec4::new(p.x, p.y, 0.0, 1.0);
    let w = if v.w == 0.0 { 1.0 } else { v.w };
    [v.x / w, v.y / w, v.z / w]
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn strides_match_float_counts() {
        assert_eq!(std::mem::size_of::<ShapeVertex>(), ShapeVertex::STRIDE * 4);
        assert_eq!(std::mem::size_of::<ImageVertex>(), ImageVertex::STRIDE * 4);
    }

    #[test]
    fn transform_point_applies_translation() {
        let m = Mat4::from_translation(Vec3::new(10.0, -5.0, 0.0));
        assert_eq!(transform_point(&m, Vec2::new(1.0, 2.0)), [11.0, -3.0, 0.0]);
    }

    #[test]
    fn transform_point_guards_zero_w() {
        let m = Mat4::ZERO;
        let p = transform_point(&m, Vec2::new(3.0, 4.0));
        assert!(p.iter().all(|c| c.is_finite()));
        assert_eq!(p, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn transform_point_divides_by_w() {
        let mut m = Mat4::IDENTITY;
        m.w_axis.w = 2.0;
        assert_eq!(transform_point(&m, Vec2::new(4.0, 8.0)), [2.0, 4.0, 0.0]);
    }
}
