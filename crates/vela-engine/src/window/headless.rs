use std::rc::Rc;
use std::time::Duration;

use crate::core::{App, AppControl, FrameCtx, InitCtx};
use crate::device::{Gpu, GpuInit, HeadlessProbe};
use crate::input::{InputEvent, InputFrame, InputState};
use crate::time::FrameClock;

use super::control::{Command, ExitStatus, RuntimeCtx};

#[derive(Debug, Clone)]
enum Scripted {
    Input(InputEvent),
    Resize(u32, u32),
}

/// Drives an [`App`] for a fixed number of frames against the headless backend.
///
/// Time advances by a fixed `dt` per frame and input can be scripted per frame,
/// so runs are deterministic. Inspect what was issued through [`probe`](Self::probe).
pub struct HeadlessRuntime {
    gpu: Rc<Gpu>,
    probe: HeadlessProbe,
    gpu_init: GpuInit,
    frames: u64,
    dt: Duration,
    framebuffer_size: (u32, u32),
    script: Vec<(u64, Scripted)>,
    cursor_captured: bool,
}

impl HeadlessRuntime {
    pub fn new(frames: u64) -> Self {
        let (gpu, probe) = Gpu::headless();
        Self {
            gpu,
            probe,
            gpu_init: GpuInit::default(),
            frames,
            dt: Duration::from_micros(16_667),
            framebuffer_size: (1600, 900),
            script: Vec::new(),
            cursor_captured: false,
        }
    }

    pub fn with_dt(mut self, dt: Duration) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_framebuffer_size(mut self, width: u32, height: u32) -> Self {
        self.framebuffer_size = (width, height);
        self
    }

    pub fn with_gpu_init(mut self, init: GpuInit) -> Self {
        self.gpu_init = init;
        self
    }

    /// Delivers `event` right before frame `frame` (0-based).
    pub fn input_at(mut self, frame: u64, event: InputEvent) -> Self {
        self.script.push((frame, Scripted::Input(event)));
        self
    }

    /// Resizes the framebuffer right before frame `frame`.
    pub fn resize_at(mut self, frame: u64, width: u32, height: u32) -> Self {
        self.script.push((frame, Scripted::Resize(width, height)));
        self
    }

    pub fn probe(&self) -> &HeadlessProbe {
        &self.probe
    }

    /// Last capture state requested by the app.
    pub fn cursor_captured(&self) -> bool {
        self.cursor_captured
    }

    /// Runs `app` to completion and drops it before returning.
    pub fn run<A: App>(&mut self, mut app: A) -> ExitStatus {
        let status = self.drive(&mut app);
        drop(app);
        log::debug!("headless run finished: {status:?}");
        status
    }

    fn drive<A: App>(&mut self, app: &mut A) -> ExitStatus {
        self.gpu.configure(&self.gpu_init);
        let (w, h) = self.framebuffer_size;
        self.gpu.resize(w, h);

        let mut init = InitCtx {
            gpu: &self.gpu,
            framebuffer_size: self.framebuffer_size,
        };
        if let Err(err) = app.init(&mut init) {
            log::error!("application init failed: {err:#}");
            return ExitStatus::AppFailed;
        }

        let mut clock = FrameClock::new();
        let mut input_state = InputState::default();
        let mut input_frame = InputFrame::default();

        for frame in 0..self.frames {
            for (_, scripted) in self.script.iter().filter(|(at, _)| *at == frame) {
                match scripted {
                    Scripted::Input(ev) => input_state.apply_event(&mut input_frame, ev.clone()),
                    Scripted::Resize(w, h) => {
                        self.framebuffer_size = (*w, *h);
                        self.gpu.resize(*w, *h);
                        app.on_resize(*w, *h);
                    }
                }
            }

            let mut runtime = RuntimeCtx::new(self.cursor_captured);
            let result = app.on_frame(&mut FrameCtx {
                gpu: &self.gpu,
                input: &input_state,
                input_frame: &input_frame,
                time: clock.advance(self.dt),
                framebuffer_size: self.framebuffer_size,
                runtime: &mut runtime,
            });
            input_frame.clear();

            let control = match result {
                Ok(control) => control,
                Err(err) => {
                    log::error!("application frame failed: {err:#}");
                    return ExitStatus::AppFailed;
                }
            };

            let mut exit = control == AppControl::Exit;
            for command in runtime.take_commands() {
                match command {
                    Command::CaptureCursor(captured) => self.cursor_captured = captured,
                    Command::Exit => exit = true,
                }
            }
            if exit {
                break;
            }
        }

        ExitStatus::Success
    }
}
