//! Drawable scene content.
//!
//! Responsibilities:
//! - vertex formats and the built-in primitive meshes
//! - `Mesh` (geometry + positional texture units) and `Model` (flattened scene)
//! - the importer-facing scene graph and the glTF importer
//! - light sources written into material uniforms

mod graph;
mod lights;
mod mesh;
mod model;
mod vertex;

#[cfg(feature = "gltf")]
mod gltf_import;

pub mod primitives;

pub use graph::{SceneGraph, SceneMaterial, SceneMesh, SceneNode};
pub use lights::{DirLight, PointLight, SpotLight};
pub use mesh::{Mesh, MAX_TEXTURE_UNITS};
pub use model::{resolve_texture_path, Model};
pub use vertex::{ColorVertex, Vertex, VertexFormat};

#[cfg(feature = "gltf")]
pub use gltf_import::import as import_gltf;
