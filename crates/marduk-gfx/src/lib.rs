//! Batched immediate-mode 2D renderer.
//!
//! [`render::Graphics`] batches triangles and textured quads and draws them
//! through a [`render::GpuContext`]. [`device::WgpuBackend`] is the wgpu
//! implementation; [`window::Runtime`] wires it to a winit window.

pub mod coords;
pub mod core;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod text;
pub mod time;
pub mod window;
