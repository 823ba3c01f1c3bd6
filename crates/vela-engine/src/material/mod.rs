//! Materials: one linked program per shading model, plus the per-draw
//! uniform protocol.
//!
//! Uniform names written here must match the declarations in
//! `assets/shaders/<stem>.glsl` exactly; a mismatch fails with
//! `Error::UniformNotFound` at the first `update`.

mod context;
mod kind;
mod material;
mod properties;

pub use context::DrawContext;
pub use kind::MaterialKind;
pub use material::{Material, MaterialParams};
pub use properties::{BasicProperties, PhongProperties};

/// Shader sources shipped with the workspace.
pub const SHADER_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/shaders");
