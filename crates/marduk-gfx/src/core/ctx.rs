use glam::Vec2;
use winit::window::Window;

use crate::device::WgpuBackend;
use crate::render::Graphics;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Window handle and metadata for the current frame.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl WindowCtx<'_> {
    /// Drawable size in physical pixels, the unit [`Graphics`] draws in.
    pub fn size(&self) -> Vec2 {
        let size = self.window.inner_size();
        Vec2::new(size.width as f32, size.height as f32)
    }

    pub fn scale_factor(&self) -> f32 {
        self.window.scale_factor() as f32
    }
}

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window borrow carried by the wgpu surface
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gfx: &'a mut Graphics<WgpuBackend<'w>>,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}
