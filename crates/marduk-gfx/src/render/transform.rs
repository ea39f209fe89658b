use glam::Mat4;

use super::error::GraphicsError;

/// Bounded stack of model matrices.
///
/// Invariants:
/// - the base frame always exists and is never popped
/// - `len() <= max_depth`
/// - storage is reserved up front; pushes never reallocate
#[derive(Debug, Clone)]
pub struct TransformStack {
    frames: Vec<Mat4>,
    max_depth: usize,
}

impl TransformStack {
    /// `max_depth` counts the base frame and is clamped to at least 1.
    pub fn new(max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        let mut frames = Vec::with_capacity(max_depth);
        frames.push(Mat4::IDENTITY);
        Self { frames, max_depth }
    }

    #[inline]
    pub fn top(&self) -> Mat4 {
        // Never empty: the base frame cannot be popped.
        self.frames[self.frames.len() - 1]
    }

    /// Number of frames including the base.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Pushes a copy of the current top.
    pub fn push(&mut self) -> Result<(), GraphicsError> {
        self.push_raw(self.top())
    }

    /// Pushes `top * m`: `m` is expressed in the current frame.
    pub fn push_with(&mut self, m: Mat4) -> Result<(), GraphicsError> {
        self.push_raw(self.top() * m)
    }

    fn push_raw(&mut self, m: Mat4) -> Result<(), GraphicsError> {
        if self.frames.len() >= self.max_depth {
            return Err(GraphicsError::TransformOverflow {
                max: self.max_depth,
            });
        }
        self.frames.push(m);
        Ok(())
    }

    /// Removes and returns the top frame.
    pub fn pop(&mut self) -> Result<Mat4, GraphicsError> {
        if self.frames.len() <= 1 {
            return Err(GraphicsError::TransformUnderflow);
        }
        self.frames.pop().ok_or(GraphicsError::TransformUnderflow)
    }

    /// Composes `m` into the current frame without pushing.
    pub fn apply(&mut self, m: Mat4) {
        let last = self.frames.len() - 1;
        self.frames[last] *= m;
    }

    /// Drops every frame above the base and resets the base to identity.
    pub fn reset(&mut self) {
        self.frames.truncate(1);
        self.frames[0] = Mat4::IDENTITY;
    }
}
