use glam::{Mat4, Vec3};

use crate::scene::{DirLight, PointLight, SpotLight};

/// Per-draw inputs a material writes into its program.
///
/// Built fresh for every draw, so a material can never read stale or unset
/// transforms. Kinds that don't need a field ignore it.
#[derive(Debug, Copy, Clone)]
pub struct DrawContext<'a> {
    /// `projection * view * model`.
    pub pvm: Mat4,
    pub model: Mat4,
    /// `transpose(inverse(model))`.
    pub normal: Mat4,
    /// Camera position in world space.
    pub view_pos: Vec3,
    pub dir_lights: &'a [DirLight],
    pub point_lights: &'a [PointLight],
    pub spot_lights: &'a [SpotLight],
}

impl<'a> DrawContext<'a> {
    /// Derives `pvm` and `normal` from the camera matrices and `model`.
    pub fn new(projection: Mat4, view: Mat4, model: Mat4, view_pos: Vec3) -> Self {
        Self {
            pvm: projection * view * model,
            model,
            normal: model.inverse().transpose(),
            view_pos,
            dir_lights: &[],
            point_lights: &[],
            spot_lights: &[],
        }
    }

    /// Context carrying only a combined transform, for the unlit kinds.
    pub fn from_pvm(pvm: Mat4) -> Self {
        Self {
            pvm,
            model: Mat4::IDENTITY,
            normal: Mat4::IDENTITY,
            view_pos: Vec3::ZERO,
            dir_lights: &[],
            point_lights: &[],
            spot_lights: &[],
        }
    }

    pub fn with_lights(
        mut self,
        dir_lights: &'a [DirLight],
        point_lights: &'a [PointLight],
        spot_lights: &'a [SpotLight],
    ) -> Self {
        self.dir_lights = dir_lights;
        self.point_lights = point_lights;
        self.spot_lights = spot_lights;
        self
    }
}
