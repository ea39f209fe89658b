use glam::Mat4;

/// Size of the surface currently being drawn to, in pixels.
///
/// Batches work in pixel space (top-left origin, +Y down); the viewport turns
/// that into the orthographic projection uploaded at flush time.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Projection for the backbuffer: `(0, 0)` maps to the top-left corner.
    pub fn projection(self) -> Mat4 {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        Mat4::orthographic_rh(0.0, w, h, 0.0, -1.0, 1.0)
    }

    /// Projection for an off-screen target.
    ///
    /// Targets are rasterized bottom-up, so their texels end up vertically
    /// mirrored and are sampled back with flipped texture coordinates.
    pub fn target_projection(self) -> Mat4 {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        Mat4::orthographic_rh(0.0, w, 0.0, h, -1.0, 1.0)
    }
}
