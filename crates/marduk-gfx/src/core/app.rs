use anyhow::Result;
use winit::event::WindowEvent;

use crate::device::WgpuBackend;
use crate::render::Graphics;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`Runtime`](crate::window::Runtime).
pub trait App {
    /// Called once the window and its renderer exist, before the first frame.
    /// Create textures, render targets, shaders and fonts here.
    fn init(&mut self, gfx: &mut Graphics<WgpuBackend<'_>>) -> Result<()> {
        let _ = gfx;
        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per presented frame, between `Graphics::start` and
    /// `Graphics::end`. Errors stop the runtime.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl>;
}
