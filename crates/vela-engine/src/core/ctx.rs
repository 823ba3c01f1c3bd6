use std::rc::Rc;

use crate::device::Gpu;
use crate::input::{InputFrame, InputState};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Context handed to `App::init`.
pub struct InitCtx<'a> {
    pub gpu: &'a Rc<Gpu>,
    /// Framebuffer size in physical pixels.
    pub framebuffer_size: (u32, u32),
}

/// Per-frame context passed to `App::on_frame`.
pub struct FrameCtx<'a> {
    pub gpu: &'a Rc<Gpu>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
    /// Framebuffer size in physical pixels.
    pub framebuffer_size: (u32, u32),
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_> {
    /// Clears color, depth and stencil to `color`.
    pub fn clear(&self, color: [f32; 4]) {
        self.gpu.api().clear_color(color);
        self.gpu.clear_frame();
    }

    /// Width over height, or 1 while the framebuffer is empty.
    pub fn aspect(&self) -> f32 {
        match self.framebuffer_size {
            (w, h) if w > 0 && h > 0 => w as f32 / h as f32,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FrameClock;

    #[test]
    fn clear_sets_color_then_clears_all_planes() {
        let (gpu, probe) = Gpu::headless();
        let input = InputState::default();
        let input_frame = InputFrame::default();
        let mut runtime = RuntimeCtx::default();
        let ctx = FrameCtx {
            gpu: &gpu,
            input: &input,
            input_frame: &input_frame,
            time: FrameClock::new().tick(),
            framebuffer_size: (0, 0),
            runtime: &mut runtime,
        };

        ctx.clear([0.2, 0.3, 0.4, 1.0]);

        assert_eq!(probe.clear_color(), [0.2, 0.3, 0.4, 1.0]);
        assert_eq!(probe.clears(), 1);
        assert_eq!(ctx.aspect(), 1.0);
    }
}
