//! Material property structs written as a single uniform struct.
//!
//! Writing one of these also binds its enabled textures, each on the unit its
//! sampler field is set to.

use std::rc::Rc;

use glam::Vec3;

use crate::error::Result;
use crate::resources::{Program, Texture2D, Uniform};

/// Fields: `color`, `materialTexture` (unit 0), `enableTexture`.
#[derive(Debug, Clone)]
pub struct BasicProperties {
    pub color: Vec3,
    pub texture: Option<Rc<Texture2D>>,
    pub enable_texture: bool,
}

impl Default for BasicProperties {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            texture: None,
            enable_texture: false,
        }
    }
}

impl Uniform for BasicProperties {
    fn write(&self, program: &Program, name: &str) -> Result<()> {
        program.uniform(&format!("{name}.color"), &self.color)?;
        program.uniform(&format!("{name}.materialTexture"), &0)?;
        program.uniform(&format!("{name}.enableTexture"), &self.enable_texture)?;
        bind_if_enabled(self.enable_texture, &self.texture, 0);
        Ok(())
    }
}

/// Fields: `ambientColor`, `diffuseColor`, `specularColor`, `shininess`, plus
/// a sampler and an enable flag per color (units 0, 1, 2).
#[derive(Debug, Clone)]
pub struct PhongProperties {
    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub shininess: f32,

    pub ambient_texture: Option<Rc<Texture2D>>,
    pub enable_ambient_texture: bool,
    pub diffuse_texture: Option<Rc<Texture2D>>,
    pub enable_diffuse_texture: bool,
    pub specular_texture: Option<Rc<Texture2D>>,
    pub enable_specular_texture: bool,
}

impl Default for PhongProperties {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::ONE,
            diffuse_color: Vec3::ONE,
            specular_color: Vec3::ONE,
            shininess: 16.0,
            ambient_texture: None,
            enable_ambient_texture: false,
            diffuse_texture: None,
            enable_diffuse_texture: false,
            specular_texture: None,
            enable_specular_texture: false,
        }
    }
}

impl Uniform for PhongProperties {
    fn write(&self, program: &Program, name: &str) -> Result<()> {
        program.uniform(&format!("{name}.ambientColor"), &self.ambient_color)?;
        program.uniform(&format!("{name}.diffuseColor"), &self.diffuse_color)?;
        program.uniform(&format!("{name}.specularColor"), &self.specular_color)?;
        program.uniform(&format!("{name}.shininess"), &self.shininess)?;

        let maps = [
            ("ambient", &self.ambient_texture, self.enable_ambient_texture),
            ("diffuse", &self.diffuse_texture, self.enable_diffuse_texture),
            ("specular", &self.specular_texture, self.enable_specular_texture),
        ];
        for (unit, (field, texture, enabled)) in maps.into_iter().enumerate() {
            let enable_field = format!("{name}.enable{}Texture", capitalize(field));
            program.uniform(&format!("{name}.{field}Texture"), &(unit as i32))?;
            program.uniform(&enable_field, &enabled)?;
            bind_if_enabled(enabled, texture, unit as u32);
        }
        Ok(())
    }
}

fn bind_if_enabled(enabled: bool, texture: &Option<Rc<Texture2D>>, unit: u32) {
    if let (true, Some(texture)) = (enabled, texture) {
        texture.bind(unit);
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
