use winit::event::WindowEvent;

use super::ctx::{FrameCtx, InitCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by `Runtime` and `HeadlessRuntime`.
///
/// GPU resources are created in `init`, once a context is current, and must be
/// owned by the app so the runtime can drop them before the context goes away.
pub trait App {
    fn init(&mut self, ctx: &mut InitCtx<'_>) -> anyhow::Result<()>;

    /// Raw window events, delivered before input translation. Only the
    /// windowed runtime calls this.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Framebuffer size changed. The GL viewport has already been updated.
    fn on_resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> anyhow::Result<AppControl>;
}
