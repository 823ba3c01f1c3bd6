use std::path::Path;

use glam::{Vec2, Vec3, Vec4};

use crate::assets::ShaderLoader;
use crate::device::ShaderStage;
use crate::error::Result;
use crate::resources::{ArrayElement, Program};

use super::context::DrawContext;
use super::kind::MaterialKind;

/// Values a material owns between draws. Each kind reads only its own fields.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MaterialParams {
    /// `uColor` of [`MaterialKind::BasicColor`].
    pub color: Vec4,
    /// `uInterpolation` of [`MaterialKind::BasicTextureInterpolated`].
    pub interpolation: f32,

    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,

    /// `uTextureTile` / `uTextureOffset` of [`MaterialKind::PhongTextured`].
    pub texture_tile: Vec2,
    pub texture_offset: Vec2,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            interpolation: 0.5,
            ambient: Vec3::ONE,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            shininess: 16.0,
            texture_tile: Vec2::ONE,
            texture_offset: Vec2::ZERO,
        }
    }
}

/// A linked program for one [`MaterialKind`] plus its parameters.
///
/// Usage per draw: `use_material`, `update`, draw the mesh, `halt`.
#[derive(Debug)]
pub struct Material {
    kind: MaterialKind,
    program: Program,
    pub params: MaterialParams,
}

impl Material {
    /// Loads `<shader_dir>/<stem>.glsl` as both stages through `shaders` and
    /// links them. Sampler units are written once here.
    pub fn new(kind: MaterialKind, shaders: &mut ShaderLoader, shader_dir: impl AsRef<Path>) -> Result<Self> {
        let path = shader_dir
            .as_ref()
            .join(format!("{}.glsl", kind.shader_stem()));

        let stages = [
            shaders.load(ShaderStage::Vertex, &path)?,
            shaders.load(ShaderStage::Fragment, &path)?,
        ];
        let program = Program::new(shaders.gpu(), &stages)?;

        let samplers = kind.sampler_units();
        if !samplers.is_empty() {
            program.use_program();
            for (name, unit) in samplers {
                program.uniform(name, unit)?;
            }
            program.halt();
        }

        log::debug!("material {kind} ready (program {})", program.handle());
        Ok(Self {
            kind,
            program,
            params: MaterialParams::default(),
        })
    }

    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn use_material(&self) {
        self.program.use_program();
    }

    pub fn halt(&self) {
        self.program.halt();
    }

    /// Writes this kind's uniforms from `params` and `ctx`. The material must
    /// be in use.
    pub fn update(&self, ctx: &DrawContext<'_>) -> Result<()> {
        let p = &self.program;
        let params = &self.params;

        match self.kind {
            MaterialKind::BasicColor => {
                p.uniform("uColor", &params.color)?;
                p.uniform("uPVM", &ctx.pvm)?;
            }
            MaterialKind::BasicColorInterpolated | MaterialKind::BasicTexture => {
                p.uniform("uPVM", &ctx.pvm)?;
            }
            MaterialKind::BasicTextureInterpolated => {
                p.uniform("uInterpolation", &params.interpolation)?;
                p.uniform("uPVM", &ctx.pvm)?;
            }
            MaterialKind::Phong | MaterialKind::Gouraud => {
                self.write_transforms(ctx)?;
                p.uniform("uMaterial.ambient", &params.ambient)?;
                p.uniform("uMaterial.diffuse", &params.diffuse)?;
                p.uniform("uMaterial.specular", &params.specular)?;
                p.uniform("uMaterial.shininess", &params.shininess)?;
                self.write_lights(ctx)?;
            }
            MaterialKind::PhongTextured => {
                self.write_transforms(ctx)?;
                p.uniform("uTextureTile", &params.texture_tile)?;
                p.uniform("uTextureOffset", &params.texture_offset)?;
                p.uniform("uMaterial.shininess", &params.shininess)?;
                self.write_lights(ctx)?;
            }
        }
        Ok(())
    }

    fn write_transforms(&self, ctx: &DrawContext<'_>) -> Result<()> {
        let p = &self.program;
        p.uniform("uViewPos", &ctx.view_pos)?;
        p.uniform("uNormal", &ctx.normal)?;
        p.uniform("uModel", &ctx.model)?;
        p.uniform("uPVM", &ctx.pvm)
    }

    fn write_lights(&self, ctx: &DrawContext<'_>) -> Result<()> {
        self.write_light_list("uDirLights", ctx.dir_lights)?;
        self.write_light_list("uPointLights", ctx.point_lights)?;
        self.write_light_list("uSpotLights", ctx.spot_lights)
    }

    /// Writes `lights` truncated at capacity, then zeroes the intensity of
    /// every remaining slot so lights from an earlier draw go dark.
    fn write_light_list<L: ArrayElement>(&self, name: &str, lights: &[L]) -> Result<()> {
        let p = &self.program;
        p.uniform(name, lights)?;
        for i in lights.len().min(L::CAPACITY)..L::CAPACITY {
            p.uniform(&format!("{name}[{i}].intensity"), &0.0f32)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use glam::Mat4;

    use crate::device::{Gpu, HeadlessProbe, UniformValue};
    use crate::material::SHADER_DIR;
    use crate::scene::{DirLight, PointLight, SpotLight};

    fn material(kind: MaterialKind) -> (Material, ShaderLoader, HeadlessProbe) {
        let (gpu, probe) = Gpu::headless();
        let mut shaders = ShaderLoader::new(&gpu);
        let material = Material::new(kind, &mut shaders, SHADER_DIR).unwrap();
        (material, shaders, probe)
    }

    fn written(probe: &HeadlessProbe) -> Vec<String> {
        probe.uniform_writes().into_iter().map(|w| w.name).collect()
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn every_kind_links_and_updates() {
        let dir = [DirLight::default()];
        let point = [PointLight::new(Vec3::ONE, 10.0)];
        let spot = [SpotLight::new(Vec3::Y, Vec3::NEG_Y, 20.0, 12.5, 17.5)];

        for kind in MaterialKind::ALL {
            let (material, _shaders, probe) = material(kind);
            let ctx = DrawContext::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY, Vec3::Z)
                .with_lights(&dir, &point, &spot);

            material.use_material();
            material.update(&ctx).unwrap_or_else(|e| panic!("{kind}: {e}"));
            material.halt();

            assert!(probe.violations().is_empty(), "{kind}: {:?}", probe.violations());
        }
    }

    #[test]
    fn samplers_are_assigned_once() {
        let (material, _shaders, probe) = material(MaterialKind::PhongTextured);
        let h = material.program().handle();

        assert_eq!(probe.uniform_value(h, "uMaterial.diffuse"), Some(UniformValue::Int1(0)));
        assert_eq!(probe.uniform_value(h, "uMaterial.specular"), Some(UniformValue::Int1(1)));
        assert_eq!(probe.current_program(), None);
    }

    #[test]
    fn kinds_share_nothing_but_same_kind_shares_shaders() {
        let (gpu, probe) = Gpu::headless();
        let mut shaders = ShaderLoader::new(&gpu);

        let a = Material::new(MaterialKind::Phong, &mut shaders, SHADER_DIR).unwrap();
        let b = Material::new(MaterialKind::Phong, &mut shaders, SHADER_DIR).unwrap();

        assert_eq!(shaders.len(), 2);
        assert_eq!(probe.live_shaders(), 2);
        assert!(Rc::ptr_eq(&a.program().shaders()[0], &b.program().shaders()[0]));
        assert_ne!(a.program(), b.program());
    }

    #[test]
    fn missing_shader_file_fails() {
        let (gpu, _probe) = Gpu::headless();
        let mut shaders = ShaderLoader::new(&gpu);
        let dir = tempfile::tempdir().unwrap();

        let err = Material::new(MaterialKind::BasicColor, &mut shaders, dir.path()).unwrap_err();
        assert!(matches!(err, crate::error::Error::Io { .. }));
    }

    // ── updates ───────────────────────────────────────────────────────────

    #[test]
    fn basic_color_writes_color_then_pvm() {
        let (mut material, _shaders, probe) = material(MaterialKind::BasicColor);
        material.params.color = Vec4::new(1.0, 0.0, 0.0, 1.0);

        material.use_material();
        material.update(&DrawContext::from_pvm(Mat4::IDENTITY)).unwrap();

        assert_eq!(written(&probe), vec!["uColor", "uPVM"]);
        assert_eq!(
            probe.uniform_value(material.program().handle(), "uColor"),
            Some(UniformValue::Float4([1.0, 0.0, 0.0, 1.0]))
        );
    }

    #[test]
    fn interpolated_texture_writes_factor() {
        let (mut material, _shaders, probe) = material(MaterialKind::BasicTextureInterpolated);
        material.params.interpolation = 0.25;
        probe.reset_records();

        material.use_material();
        material.update(&DrawContext::from_pvm(Mat4::IDENTITY)).unwrap();

        assert_eq!(written(&probe), vec!["uInterpolation", "uPVM"]);
    }

    #[test]
    fn phong_writes_transforms_material_and_truncated_lights() {
        let (material, _shaders, probe) = material(MaterialKind::Phong);
        let dir = [DirLight::default(); 3];
        let ctx = DrawContext::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO)
            .with_lights(&dir, &[], &[]);

        material.use_material();
        material.update(&ctx).unwrap();

        let names = written(&probe);
        assert_eq!(
            &names[..8],
            &[
                "uViewPos",
                "uNormal",
                "uModel",
                "uPVM",
                "uMaterial.ambient",
                "uMaterial.diffuse",
                "uMaterial.specular",
                "uMaterial.shininess",
            ]
        );
        // Two dir lights of five fields, then the empty point and spot slots.
        assert_eq!(names.len(), 8 + 2 * 5 + 4 + 2);
        assert!(names.iter().all(|n| !n.starts_with("uDirLights[2]")));
    }

    #[test]
    fn shorter_light_list_darkens_leftover_slots() {
        let (material, _shaders, probe) = material(MaterialKind::Phong);
        let h = material.program().handle();
        let both = [
            PointLight::new(Vec3::X, 10.0),
            PointLight::new(Vec3::NEG_X, 10.0),
        ];
        let identity = || DrawContext::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO);

        material.use_material();
        material.update(&identity().with_lights(&[], &both, &[])).unwrap();
        assert_eq!(
            probe.uniform_value(h, "uPointLights[1].intensity"),
            Some(UniformValue::Float1(1.0))
        );

        material.update(&identity().with_lights(&[], &both[..1], &[])).unwrap();
        assert_eq!(
            probe.uniform_value(h, "uPointLights[0].intensity"),
            Some(UniformValue::Float1(1.0))
        );
        for slot in 1..PointLight::CAPACITY {
            assert_eq!(
                probe.uniform_value(h, &format!("uPointLights[{slot}].intensity")),
                Some(UniformValue::Float1(0.0)),
                "slot {slot}"
            );
        }
        assert_eq!(
            probe.uniform_value(h, "uDirLights[0].intensity"),
            Some(UniformValue::Float1(0.0))
        );
        assert!(probe.violations().is_empty());
    }

    #[test]
    fn phong_textured_writes_tiling() {
        let (mut material, _shaders, probe) = material(MaterialKind::PhongTextured);
        material.params.texture_tile = Vec2::splat(4.0);
        probe.reset_records();

        material.use_material();
        material
            .update(&DrawContext::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO))
            .unwrap();

        let h = material.program().handle();
        assert_eq!(probe.uniform_value(h, "uTextureTile"), Some(UniformValue::Float2([4.0, 4.0])));
        assert_eq!(probe.uniform_value(h, "uTextureOffset"), Some(UniformValue::Float2([0.0, 0.0])));
        assert!(!written(&probe).contains(&"uMaterial.ambient".to_string()));
    }
}
