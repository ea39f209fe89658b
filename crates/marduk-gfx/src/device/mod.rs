//! wgpu device, surface and the [`GpuContext`](crate::render::GpuContext)
//! implementation the renderer runs on.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - turning recorded batch flushes into render passes once per frame

mod backend;
mod gpu;
mod pipeline;
mod surface;

pub use backend::WgpuBackend;
pub use gpu::{Gpu, GpuInit, SurfaceFrame};
pub use surface::SurfaceErrorAction;
