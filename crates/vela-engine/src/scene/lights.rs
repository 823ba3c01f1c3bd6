//! Light sources, written into the `uDirLights`, `uPointLights` and
//! `uSpotLights` uniform arrays of the lit materials.
//!
//! Each kind has a fixed shader-side capacity. Longer lists are truncated at
//! write time without error.

use glam::Vec3;

use crate::error::Result;
use crate::resources::{ArrayElement, Program};

/// Attenuation terms for a light that should fade out at `range`.
///
/// Empirical fit: `linear = 4.5 / range`, `quadratic = 75 / range`.
fn attenuation(range: f32) -> (f32, f32) {
    (4.5 / range, 75.0 / range)
}

// ── directional ───────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirLight {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub direction: Vec3,
    pub intensity: f32,
}

impl Default for DirLight {
    fn default() -> Self {
        Self {
            ambient: Vec3::ZERO,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            direction: Vec3::NEG_Y,
            intensity: 1.0,
        }
    }
}

impl ArrayElement for DirLight {
    const CAPACITY: usize = 2;

    fn write_fields(&self, program: &Program, prefix: &str) -> Result<()> {
        program.uniform(&format!("{prefix}.ambient"), &self.ambient)?;
        program.uniform(&format!("{prefix}.diffuse"), &self.diffuse)?;
        program.uniform(&format!("{prefix}.specular"), &self.specular)?;
        program.uniform(&format!("{prefix}.direction"), &self.direction)?;
        program.uniform(&format!("{prefix}.intensity"), &self.intensity)
    }
}

// ── point ─────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointLight {
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub position: Vec3,
    pub range: f32,
    pub intensity: f32,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    /// White light at `position` with terms derived from `range`.
    pub fn new(position: Vec3, range: f32) -> Self {
        let mut light = Self {
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            position,
            range,
            intensity: 1.0,
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        };
        light.recalculate_default_terms();
        light
    }

    /// Derives `linear` and `quadratic` from `range`.
    pub fn recalculate_terms(&mut self, constant: f32) {
        self.constant = constant;
        (self.linear, self.quadratic) = attenuation(self.range);
    }

    pub fn recalculate_default_terms(&mut self) {
        self.recalculate_terms(1.0);
    }
}

impl ArrayElement for PointLight {
    const CAPACITY: usize = 4;

    fn write_fields(&self, program: &Program, prefix: &str) -> Result<()> {
        program.uniform(&format!("{prefix}.diffuse"), &self.diffuse)?;
        program.uniform(&format!("{prefix}.specular"), &self.specular)?;
        program.uniform(&format!("{prefix}.position"), &self.position)?;
        program.uniform(&format!("{prefix}.range"), &self.range)?;
        program.uniform(&format!("{prefix}.intensity"), &self.intensity)?;
        program.uniform(&format!("{prefix}.constant"), &self.constant)?;
        program.uniform(&format!("{prefix}.linear"), &self.linear)?;
        program.uniform(&format!("{prefix}.quadratic"), &self.quadratic)
    }
}

// ── spot ──────────────────────────────────────────────────────────────────

/// Cone light. `cutoff` and `outer_cutoff` are cosines of the inner and outer
/// half-angles.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpotLight {
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub position: Vec3,
    pub direction: Vec3,
    pub range: f32,
    pub intensity: f32,
    pub cutoff: f32,
    pub outer_cutoff: f32,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl SpotLight {
    /// White cone from `position` along `direction`, half-angles in degrees.
    pub fn new(position: Vec3, direction: Vec3, range: f32, inner_deg: f32, outer_deg: f32) -> Self {
        let mut light = Self {
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            position,
            direction,
            range,
            intensity: 1.0,
            cutoff: inner_deg.to_radians().cos(),
            outer_cutoff: outer_deg.to_radians().cos(),
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        };
        light.recalculate_default_terms();
        light
    }

    pub fn recalculate_terms(&mut self, constant: f32) {
        self.constant = constant;
        (self.linear, self.quadratic) = attenuation(self.range);
    }

    pub fn recalculate_default_terms(&mut self) {
        self.recalculate_terms(1.0);
    }
}

impl ArrayElement for SpotLight {
    const CAPACITY: usize = 2;

    fn write_fields(&self, program: &Program, prefix: &str) -> Result<()> {
        program.uniform(&format!("{prefix}.diffuse"), &self.diffuse)?;
        program.uniform(&format!("{prefix}.specular"), &self.specular)?;
        program.uniform(&format!("{prefix}.position"), &self.position)?;
        program.uniform(&format!("{prefix}.direction"), &self.direction)?;
        program.uniform(&format!("{prefix}.range"), &self.range)?;
        program.uniform(&format!("{prefix}.intensity"), &self.intensity)?;
        program.uniform(&format!("{prefix}.cutoff"), &self.cutoff)?;
        program.uniform(&format!("{prefix}.outerCutoff"), &self.outer_cutoff)?;
        program.uniform(&format!("{prefix}.constant"), &self.constant)?;
        program.uniform(&format!("{prefix}.linear"), &self.linear)?;
        program.uniform(&format!("{prefix}.quadratic"), &self.quadratic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::device::{Gpu, HeadlessProbe, ShaderStage};
    use crate::resources::Shader;

    const EPS: f32 = 1e-6;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    // ── attenuation ───────────────────────────────────────────────────────

    #[test]
    fn point_light_terms_from_range() {
        let mut light = PointLight::new(Vec3::ZERO, 10.0);
        light.recalculate_default_terms();

        assert_eq!(light.constant, 1.0);
        assert!(approx(light.linear, 0.45), "linear {}", light.linear);
        assert!(approx(light.quadratic, 7.5), "quadratic {}", light.quadratic);
    }

    #[test]
    fn spot_light_terms_keep_custom_constant() {
        let mut light = SpotLight::new(Vec3::ZERO, Vec3::NEG_Z, 50.0, 12.5, 17.5);
        light.recalculate_terms(0.5);

        assert_eq!(light.constant, 0.5);
        assert!(approx(light.linear, 0.09));
        assert!(approx(light.quadratic, 1.5));
        assert!(light.cutoff > light.outer_cutoff);
    }

    // ── uniform lists ─────────────────────────────────────────────────────

    const LIT: &str = "
        struct DirLight { vec3 ambient; vec3 diffuse; vec3 specular; vec3 direction; float intensity; };
        struct PointLight {
            vec3 diffuse; vec3 specular; vec3 position;
            float range; float intensity; float constant; float linear; float quadratic;
        };
        uniform DirLight uDirLights[2];
        uniform PointLight uPointLights[4];
        void main() {}
    ";

    fn lit_program() -> (Program, HeadlessProbe) {
        let (gpu, probe) = Gpu::headless();
        let shaders = [
            Rc::new(Shader::new(&gpu, ShaderStage::Vertex, LIT).unwrap()),
            Rc::new(Shader::new(&gpu, ShaderStage::Fragment, LIT).unwrap()),
        ];
        let program = Program::new(&gpu, &shaders).unwrap();
        program.use_program();
        (program, probe)
    }

    #[test]
    fn point_lights_truncate_at_four() {
        let (program, probe) = lit_program();
        let lights: Vec<PointLight> = (0..6)
            .map(|i| PointLight::new(Vec3::splat(i as f32), 10.0))
            .collect();

        program.uniform("uPointLights", &lights).unwrap();

        let writes = probe.uniform_writes();
        assert_eq!(writes.len(), 4 * 8);
        assert!(writes.iter().all(|w| !w.name.starts_with("uPointLights[4]")));
        assert_eq!(writes[0].name, "uPointLights[0].diffuse");
        assert!(probe.violations().is_empty());
    }

    #[test]
    fn dir_light_fields_in_order() {
        let (program, probe) = lit_program();
        program.uniform("uDirLights", &vec![DirLight::default()]).unwrap();

        let names: Vec<String> = probe.uniform_writes().into_iter().map(|w| w.name).collect();
        assert_eq!(
            names,
            vec![
                "uDirLights[0].ambient",
                "uDirLights[0].diffuse",
                "uDirLights[0].specular",
                "uDirLights[0].direction",
                "uDirLights[0].intensity",
            ]
        );
    }

    #[test]
    fn empty_list_writes_nothing() {
        let (program, probe) = lit_program();
        program.uniform("uDirLights", &Vec::<DirLight>::new()).unwrap();
        assert!(probe.uniform_writes().is_empty());
    }
}
