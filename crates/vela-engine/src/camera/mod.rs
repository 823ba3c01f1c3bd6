//! Viewpoints producing projection and view matrices for `DrawContext`.

mod fps;

pub use fps::{CameraBindings, CameraState, FpsCamera, MAX_FOV, MIN_FOV, ZOOM_STEP};
