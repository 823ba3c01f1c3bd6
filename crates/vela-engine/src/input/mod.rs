//! Input subsystem.
//!
//! The public API does not expose winit types. The runtime translates platform
//! events into `InputEvent`s through [`platform::winit`].

mod frame;
mod state;
mod types;

pub mod platform;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{
    ButtonState,
    InputEvent,
    Key,
    Modifiers,
    MouseButton,
    MouseWheelDelta,
    PIXELS_PER_LINE,
};
