use std::num::NonZeroU32;
use std::rc::Rc;

use anyhow::{anyhow, Context};
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{CursorGrabMode, Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, InitCtx};
use crate::device::{GlowBackend, Gpu, GpuInit};
use crate::input::platform::winit::{translate_device_event, translate_window_event};
use crate::input::{InputFrame, InputState};
use crate::time::FrameClock;

use super::control::{Command, ExitStatus, RuntimeCtx};

/// Window and context configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Initial inner size in logical pixels.
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub vsync: bool,
    /// Requested core profile version as (major, minor).
    pub gl_version: (u8, u8),
    /// Fixed-function state applied once the context is current. `debug_output`
    /// also requests a debug context.
    pub gpu: GpuInit,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "vela".to_string(),
            width: 1600,
            height: 900,
            resizable: false,
            vsync: true,
            gl_version: (4, 0),
            gpu: GpuInit::default(),
        }
    }
}

/// Entry point for the windowed runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, creates the GL context and drives `app` until it
    /// exits, fails, or the window is closed.
    pub fn run<A: App>(config: RuntimeConfig, app: A) -> ExitStatus {
        let event_loop = match EventLoop::new() {
            Ok(event_loop) => event_loop,
            Err(err) => {
                log::error!("failed to create event loop: {err}");
                return ExitStatus::InitFailed;
            }
        };

        let mut handler = Handler::new(config, app);
        if let Err(err) = event_loop.run_app(&mut handler) {
            log::error!("event loop terminated with error: {err}");
            handler.fail(ExitStatus::InitFailed);
        }

        // Covers platforms where `exiting` is not delivered.
        handler.shutdown();
        handler.status
    }
}

/// Everything tied to the native context. Field order is drop order: the
/// backend goes first while the context is still alive.
struct WindowState {
    gpu: Rc<Gpu>,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
    cursor_captured: bool,
}

impl WindowState {
    fn framebuffer_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }
}

struct Handler<A: App> {
    config: RuntimeConfig,
    app: Option<A>,
    window: Option<WindowState>,
    input_state: InputState,
    input_frame: InputFrame,
    clock: FrameClock,
    status: ExitStatus,
    started: bool,
}

impl<A: App> Handler<A> {
    fn new(config: RuntimeConfig, app: A) -> Self {
        Self {
            config,
            app: Some(app),
            window: None,
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::new(),
            status: ExitStatus::Success,
            started: false,
        }
    }

    /// Records the first failure; later ones do not overwrite it.
    fn fail(&mut self, status: ExitStatus) {
        if self.status.is_success() {
            self.status = status;
        }
    }

    /// Drops the app (and every resource it owns) before the context.
    fn shutdown(&mut self) {
        if self.app.take().is_some() {
            log::debug!("application dropped");
        }
        if self.window.take().is_some() {
            log::debug!("gl context released");
        }
    }

    fn finish(&mut self, event_loop: &ActiveEventLoop, status: ExitStatus) {
        self.fail(status);
        self.shutdown();
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ExitStatus> {
        let state = create_window(event_loop, &self.config)?;
        let (width, height) = state.framebuffer_size();

        if let Some(app) = self.app.as_mut() {
            let mut ctx = InitCtx {
                gpu: &state.gpu,
                framebuffer_size: (width, height),
            };
            if let Err(err) = app.init(&mut ctx) {
                log::error!("application init failed: {err:#}");
                // `state` outlives the app here: shutdown drops the app first.
                self.window = Some(state);
                return Err(ExitStatus::AppFailed);
            }
        }

        state.window.request_redraw();
        self.window = Some(state);
        self.clock.reset();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (Some(state), Some(app)) = (self.window.as_ref(), self.app.as_mut()) else {
            return;
        };
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            // Minimized.
            return;
        };

        state.surface.resize(&state.context, w, h);
        state.gpu.resize(width, height);
        app.on_resize(width, height);
    }

    fn redraw(&mut self) -> Result<bool, ExitStatus> {
        let (Some(state), Some(app)) = (self.window.as_mut(), self.app.as_mut()) else {
            return Ok(false);
        };

        let mut runtime = RuntimeCtx::new(state.cursor_captured);
        let control = {
            let mut ctx = FrameCtx {
                gpu: &state.gpu,
                input: &self.input_state,
                input_frame: &self.input_frame,
                time: self.clock.tick(),
                framebuffer_size: state.framebuffer_size(),
                runtime: &mut runtime,
            };
            app.on_frame(&mut ctx)
        };
        self.input_frame.clear();

        let control = control.map_err(|err| {
            log::error!("application frame failed: {err:#}");
            ExitStatus::AppFailed
        })?;

        let mut exit = control == AppControl::Exit;
        for command in runtime.take_commands() {
            match command {
                Command::CaptureCursor(captured) => {
                    set_cursor_captured(&state.window, captured);
                    state.cursor_captured = captured;
                }
                Command::Exit => exit = true,
            }
        }

        state.window.pre_present_notify();
        if let Err(err) = state.surface.swap_buffers(&state.context) {
            log::error!("swap buffers failed: {err}");
            return Err(ExitStatus::WindowFailed);
        }

        Ok(exit)
    }
}

impl<A: App> ApplicationHandler for Handler<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        if let Err(status) = self.start(event_loop) {
            self.finish(event_loop, status);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(app) = self.app.as_mut() else {
            return;
        };

        if app.on_window_event(&event) == AppControl::Exit {
            self.finish(event_loop, ExitStatus::Success);
            return;
        }

        let scale_factor = self.window.as_ref().map_or(1.0, |s| s.window.scale_factor());
        if let Some(ev) = translate_window_event(scale_factor, &event) {
            self.input_state.apply_event(&mut self.input_frame, ev);
        }

        match event {
            WindowEvent::CloseRequested => self.finish(event_loop, ExitStatus::Success),

            WindowEvent::Resized(size) => self.resize(size.width, size.height),

            WindowEvent::RedrawRequested => match self.redraw() {
                Ok(false) => {}
                Ok(true) => self.finish(event_loop, ExitStatus::Success),
                Err(status) => self.finish(event_loop, status),
            },

            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let Some(ev) = translate_device_event(&event) {
            self.input_state.apply_event(&mut self.input_frame, ev);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(state) = self.window.as_ref() {
            state.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

fn create_window(event_loop: &ActiveEventLoop, config: &RuntimeConfig) -> Result<WindowState, ExitStatus> {
    let attributes = Window::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(LogicalSize::new(config.width, config.height))
        .with_resizable(config.resizable);

    let template = ConfigTemplateBuilder::new()
        .with_depth_size(24)
        .with_stencil_size(8);

    let (window, gl_config) = DisplayBuilder::new()
        .with_window_attributes(Some(attributes))
        .build(event_loop, template, pick_config)
        .map_err(|err| anyhow!("{err}"))
        .and_then(|(window, gl_config)| {
            let window = window.context("display builder returned no window")?;
            Ok((window, gl_config))
        })
        .map_err(|err| {
            log::error!("failed to create window: {err:#}");
            ExitStatus::WindowFailed
        })?;

    let (surface, context, gpu) = create_context(&window, &gl_config, config).map_err(|err| {
        log::error!("failed to create gl context: {err:#}");
        ExitStatus::LoaderFailed
    })?;

    gpu.configure(&config.gpu);
    let size = window.inner_size();
    gpu.resize(size.width, size.height);

    log::info!(
        "window ready ({}x{}, {} {}.{} core)",
        size.width,
        size.height,
        gpu.backend_name(),
        config.gl_version.0,
        config.gl_version.1
    );

    Ok(WindowState {
        gpu,
        surface,
        context,
        window,
        cursor_captured: false,
    })
}

fn create_context(
    window: &Window,
    gl_config: &Config,
    config: &RuntimeConfig,
) -> anyhow::Result<(Surface<WindowSurface>, PossiblyCurrentContext, Rc<Gpu>)> {
    let raw_handle = window
        .window_handle()
        .context("window has no native handle")?
        .as_raw();
    let display = gl_config.display();

    let (major, minor) = config.gl_version;
    let context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
        .with_profile(GlProfile::Core)
        .with_debug(config.gpu.debug_output)
        .build(Some(raw_handle));

    // SAFETY: the raw window handle stays valid while `window` lives, and
    // `WindowState` drops the context before the window.
    let not_current = unsafe { display.create_context(gl_config, &context_attributes) }
        .context("context creation failed")?;

    let surface_attributes = window
        .build_surface_attributes(Default::default())
        .context("surface attributes")?;
    // SAFETY: as above.
    let surface = unsafe { display.create_window_surface(gl_config, &surface_attributes) }
        .context("window surface creation failed")?;

    let context = not_current
        .make_current(&surface)
        .context("make current failed")?;

    let interval = if config.vsync {
        SwapInterval::Wait(NonZeroU32::MIN)
    } else {
        SwapInterval::DontWait
    };
    if let Err(err) = surface.set_swap_interval(&context, interval) {
        log::warn!("could not set swap interval: {err}");
    }

    // SAFETY: the context is current on this thread.
    let gl = unsafe { glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name)) };
    let gpu = Gpu::new(GlowBackend::new(gl, config.gpu.debug_output));

    Ok((surface, context, gpu))
}

/// Prefers multisampled configs.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, c| if c.num_samples() > best.num_samples() { c } else { best })
        .expect("glutin only calls the picker with at least one config")
}

fn set_cursor_captured(window: &Window, captured: bool) {
    let result = if captured {
        window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
    } else {
        window.set_cursor_grab(CursorGrabMode::None)
    };

    if let Err(err) = result {
        log::warn!("cursor grab change failed: {err}");
    }
    window.set_cursor_visible(!captured);
}
