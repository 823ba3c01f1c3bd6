use glam::{Mat4, Vec3};

use crate::input::Key;

/// Narrowest field of view `zoom` allows, in degrees.
pub const MIN_FOV: f32 = 30.0;
/// Widest field of view `zoom` allows, in degrees.
pub const MAX_FOV: f32 = 120.0;
/// Degrees removed from the field of view per scroll line.
pub const ZOOM_STEP: f32 = 5.0;

/// Movement flags toggled by [`FpsCamera::handle_key`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct CameraState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub faster: bool,
}

/// Keys driving each movement flag.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CameraBindings {
    pub forward: Key,
    pub backward: Key,
    pub left: Key,
    pub right: Key,
    pub up: Key,
    pub down: Key,
    pub faster: Key,
}

impl Default for CameraBindings {
    fn default() -> Self {
        Self {
            forward: Key::W,
            backward: Key::S,
            left: Key::A,
            right: Key::D,
            up: Key::E,
            down: Key::Q,
            faster: Key::Shift,
        }
    }
}

/// Free-flying first person camera.
///
/// Keys set movement flags, pointer samples rotate the view, and `update`
/// integrates one frame. The position eases toward a target point instead of
/// jumping, so movement starts and stops smoothly.
///
/// Angles (`pitch`, `yaw`, `fov`, `vertical_limit`) are in degrees.
#[derive(Debug, Clone)]
pub struct FpsCamera {
    pub bindings: CameraBindings,
    pub state: CameraState,

    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    pub pitch: f32,
    pub yaw: f32,

    pub speed: f32,
    pub speed_multiplier: f32,
    pub sensitivity: f32,
    /// Fraction of the remaining distance covered per update, in `0..=1`.
    pub smoothness: f32,
    pub fov: f32,
    pub vertical_limit: f32,
    pub near: f32,
    pub far: f32,

    /// Inactive cameras ignore keys and rotation and do not move.
    pub active: bool,

    target: Vec3,
    last_pointer: Option<(f32, f32)>,
    width: f32,
    height: f32,
    projection: Mat4,
    view: Mat4,
}

impl FpsCamera {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_bindings(width, height, CameraBindings::default())
    }

    pub fn with_bindings(width: f32, height: f32, bindings: CameraBindings) -> Self {
        let position = Vec3::new(0.0, 5.0, 10.0);
        let mut camera = Self {
            bindings,
            state: CameraState::default(),
            position,
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            pitch: 0.0,
            yaw: -90.0,
            speed: 10.0,
            speed_multiplier: 2.0,
            sensitivity: 0.1,
            smoothness: 0.1,
            fov: 90.0,
            vertical_limit: 89.0,
            near: 0.1,
            far: 1000.0,
            active: false,
            target: position,
            last_pointer: None,
            width,
            height,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        };
        camera.rebuild_matrices();
        camera
    }

    /// Applies a key transition. Pressing a direction cancels its opposite.
    pub fn handle_key(&mut self, key: Key, pressed: bool) {
        if !self.active {
            return;
        }

        let b = self.bindings;
        let s = &mut self.state;

        if key == b.forward {
            press_axis(&mut s.forward, &mut s.backward, pressed);
        } else if key == b.backward {
            press_axis(&mut s.backward, &mut s.forward, pressed);
        }

        if key == b.left {
            press_axis(&mut s.left, &mut s.right, pressed);
        } else if key == b.right {
            press_axis(&mut s.right, &mut s.left, pressed);
        }

        if key == b.up {
            press_axis(&mut s.up, &mut s.down, pressed);
        } else if key == b.down {
            press_axis(&mut s.down, &mut s.up, pressed);
        }

        if key == b.faster {
            s.faster = pressed;
        }
    }

    /// Feeds an absolute pointer sample.
    ///
    /// The first sample only seeds the reference point. While inactive the
    /// reference keeps tracking the pointer so activation does not jump.
    pub fn orient(&mut self, x: f32, y: f32) {
        let (last_x, last_y) = self.last_pointer.unwrap_or((x, y));
        self.last_pointer = Some((x, y));

        if !self.active {
            return;
        }

        // Screen y grows downward.
        let dx = (x - last_x) * self.sensitivity;
        let dy = (last_y - y) * self.sensitivity;

        self.yaw += dx;
        self.pitch = (self.pitch + dy).clamp(-self.vertical_limit, self.vertical_limit);

        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        self.direction = Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos);
    }

    /// Advances one frame of `dt` seconds and rebuilds the matrices.
    pub fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }

        let speed = if self.state.faster {
            self.speed * self.speed_multiplier
        } else {
            self.speed
        };
        let step = speed * dt;
        let s = self.state;

        if s.forward {
            self.target += self.direction * step;
        } else if s.backward {
            self.target -= self.direction * step;
        }

        let side = self.direction.cross(self.up).normalize_or_zero();
        if s.left {
            self.target -= side * step;
        } else if s.right {
            self.target += side * step;
        }

        if s.up {
            self.target += self.up * step;
        } else if s.down {
            self.target -= self.up * step;
        }

        self.position = self.position.lerp(self.target, self.smoothness);
        self.rebuild_matrices();
    }

    /// Narrows (positive lines) or widens the field of view.
    pub fn zoom(&mut self, lines: f32) {
        self.fov = (self.fov - ZOOM_STEP * lines).clamp(MIN_FOV, MAX_FOV);
        self.rebuild_matrices();
    }

    /// Updates the aspect ratio. Zero-sized viewports (minimized windows) are ignored.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.width = width;
        self.height = height;
        self.rebuild_matrices();
    }

    /// Moves the camera and its target at once, without easing.
    pub fn teleport(&mut self, position: Vec3) {
        self.position = position;
        self.target = position;
        self.rebuild_matrices();
    }

    /// Point the position is easing toward.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    fn rebuild_matrices(&mut self) {
        self.projection =
            Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect(), self.near, self.far);
        self.view = Mat4::look_at_rh(self.position, self.position + self.direction, self.up);
    }
}

fn press_axis(flag: &mut bool, opposite: &mut bool, pressed: bool) {
    *flag = pressed;
    if pressed {
        *opposite = false;
    }
}
