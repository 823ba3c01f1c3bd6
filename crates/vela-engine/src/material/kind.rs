use std::fmt;

/// Closed set of shading models. Each kind maps to one shader file holding
/// both stages.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MaterialKind {
    /// Flat `uColor`.
    BasicColor,
    /// Per-vertex color from a [`ColorVertex`](crate::scene::ColorVertex) mesh.
    BasicColorInterpolated,
    /// One texture on unit 0.
    BasicTexture,
    /// Blend of the textures on units 0 and 1 by `uInterpolation`.
    BasicTextureInterpolated,
    /// Per-fragment Blinn-Phong with uniform material colors.
    Phong,
    /// Per-fragment Phong with diffuse (unit 0) and specular (unit 1) maps.
    PhongTextured,
    /// Per-vertex Phong.
    Gouraud,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 7] = [
        MaterialKind::BasicColor,
        MaterialKind::BasicColorInterpolated,
        MaterialKind::BasicTexture,
        MaterialKind::BasicTextureInterpolated,
        MaterialKind::Phong,
        MaterialKind::PhongTextured,
        MaterialKind::Gouraud,
    ];

    /// File name (without extension) of the kind's shader source.
    pub fn shader_stem(self) -> &'static str {
        match self {
            MaterialKind::BasicColor => "basic_color",
            MaterialKind::BasicColorInterpolated => "basic_color_interpolated",
            MaterialKind::BasicTexture => "basic_texture",
            MaterialKind::BasicTextureInterpolated => "basic_texture_interpolated",
            MaterialKind::Phong => "phong",
            MaterialKind::PhongTextured => "phong_textured",
            MaterialKind::Gouraud => "gouraud",
        }
    }

    /// Sampler uniforms and the texture unit each one reads.
    pub fn sampler_units(self) -> &'static [(&'static str, i32)] {
        match self {
            MaterialKind::BasicTexture => &[("uTexture", 0)],
            MaterialKind::BasicTextureInterpolated => &[("uTexture0", 0), ("uTexture1", 1)],
            MaterialKind::PhongTextured => &[("uMaterial.diffuse", 0), ("uMaterial.specular", 1)],
            MaterialKind::BasicColor
            | MaterialKind::BasicColorInterpolated
            | MaterialKind::Phong
            | MaterialKind::Gouraud => &[],
        }
    }

    /// Whether `update` writes transforms, view position and light lists.
    pub fn is_lit(self) -> bool {
        matches!(
            self,
            MaterialKind::Phong | MaterialKind::PhongTextured | MaterialKind::Gouraud
        )
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shader_stem())
    }
}
