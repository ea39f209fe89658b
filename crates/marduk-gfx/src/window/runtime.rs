use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit, WgpuBackend};
use crate::render::{Clear, Graphics, GraphicsConfig};
use crate::time::FrameClock;

/// Window, device and renderer configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub gpu: GpuInit,
    pub graphics: GraphicsConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "marduk".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            gpu: GpuInit::default(),
            graphics: GraphicsConfig::default(),
        }
    }
}

/// Requests an app can make from inside a callback. Applied once the
/// callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    exit: bool,
}

impl RuntimeCtx {
    pub fn exit(&mut self) {
        self.exit = true;
    }
}

pub struct Runtime;

impl Runtime {
    /// Opens the window and runs `app` until it exits or the window closes.
    pub fn run<A>(config: RuntimeConfig, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState {
            config,
            app,
            window: None,
            failure: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    id: WindowId,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gfx: Graphics<WgpuBackend<'this>>,
}

struct AppState<A: App + 'static> {
    config: RuntimeConfig,
    app: A,
    window: Option<WindowEntry>,
    /// First fatal error; returned from [`Runtime::run`].
    failure: Option<anyhow::Error>,
}

fn build_graphics<'w>(
    window: &'w Window,
    gpu_init: GpuInit,
    config: GraphicsConfig,
) -> Result<Graphics<WgpuBackend<'w>>> {
    let gpu = pollster::block_on(Gpu::new(window, gpu_init))?;
    let gfx = Graphics::new(WgpuBackend::new(gpu), config)
        .context("failed to initialize the renderer")?;
    Ok(gfx)
}

impl<A: App + 'static> AppState<A> {
    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.config.gpu.clone();
        let graphics = self.config.graphics.clone();

        let mut entry = WindowEntryTryBuilder {
            id: window.id(),
            clock: FrameClock::default(),
            window,
            gfx_builder: |w| build_graphics(w, gpu_init, graphics),
        }
        .try_build()?;

        let app = &mut self.app;
        entry
            .with_gfx_mut(|gfx| app.init(gfx))
            .context("app initialization failed")?;

        entry.with_window(|w| w.request_redraw());
        self.window = Some(entry);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        self.window = None;
        event_loop.exit();
    }

    /// Acquire, record, submit, present.
    fn redraw(&mut self) -> Result<AppControl> {
        let Some(entry) = self.window.as_mut() else {
            return Ok(AppControl::Continue);
        };
        let app = &mut self.app;

        entry.with_mut(|fields| -> Result<AppControl> {
            let time = fields.clock.tick();

            if !fields.gfx.gpu_mut().begin_frame()? {
                return Ok(AppControl::Continue);
            }
            fields.gfx.start(Clear::Default);

            let mut runtime = RuntimeCtx::default();
            let control = {
                let mut ctx = FrameCtx {
                    window: WindowCtx {
                        window: fields.window,
                    },
                    gfx: &mut *fields.gfx,
                    time,
                    runtime: &mut runtime,
                };
                app.on_frame(&mut ctx)?
            };

            fields.gfx.end();
            fields.window.pre_present_notify();
            fields.gfx.gpu_mut().end_frame()?;

            Ok(if runtime.exit {
                AppControl::Exit
            } else {
                control
            })
        })
    }
}

impl<A: App + 'static> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.create_window(event_loop) {
            self.fail(event_loop, err.context("failed to create the initial window"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(entry) = self.window.as_mut() else {
            return;
        };
        if *entry.borrow_id() != window_id {
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.window = None;
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.window = None;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gfx_mut(|gfx| gfx.gpu_mut().resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gfx_mut(|gfx| gfx.gpu_mut().resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => match self.redraw() {
                Ok(AppControl::Continue) => {}
                Ok(AppControl::Exit) => {
                    self.window = None;
                    event_loop.exit();
                }
                Err(err) => self.fail(event_loop, err),
            },

            _ => {}
        }
    }
}
