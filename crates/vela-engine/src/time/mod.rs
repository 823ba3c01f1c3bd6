//! Frame timing.
//!
//! One `FrameClock` per render loop; call `tick()` once per presented frame,
//! or `advance(dt)` when stepping with a fixed delta.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime, DT_MAX, DT_MIN};
