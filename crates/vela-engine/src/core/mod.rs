//! Contract between the runtimes (windowed and headless) and applications.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, InitCtx};
