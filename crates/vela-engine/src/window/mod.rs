//! Runtimes driving an [`App`](crate::core::App).
//!
//! `Runtime` owns the winit event loop, the window and the GL context (through
//! glutin). `HeadlessRuntime` runs the same contract against the in-memory
//! backend.

mod control;
mod headless;
mod runtime;

pub use control::{ExitStatus, RuntimeCtx};
pub use headless::HeadlessRuntime;
pub use runtime::{Runtime, RuntimeConfig};
