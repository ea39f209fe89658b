use glam::Mat4;

use crate::paint::Color;

use super::transform::TransformStack;

/// Per-call parameters snapshotted from [`RenderState`] and handed to a batch.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct DrawState {
    pub transform: Mat4,
    pub color: Color,
    pub projection: Mat4,
}

/// Cross-cutting state both batches read at append time.
#[derive(Debug, Clone)]
pub(crate) struct RenderState {
    pub transforms: TransformStack,
    pub color: Color,
    pub projection: Mat4,
}

impl RenderState {
    pub fn new(max_transform_depth: usize) -> Self {
        Self {
            transforms: TransformStack::new(max_transform_depth),
            color: Color::WHITE,
            projection: Mat4::IDENTITY,
        }
    }

    #[inline]
    pub fn draw_state(&self) -> DrawState {
        DrawState {
            transform: self.transforms.top(),
            color: self.color,
            projection: self.projection,
        }
    }
}
