use std::rc::Rc;

use crate::assets::TextureLoader;
use crate::device::{Gpu, PrimitiveMode};
use crate::error::{Error, Result};
use crate::resources::Texture2D;

use super::graph::{SceneGraph, SceneMaterial};
use super::mesh::Mesh;

/// Flat list of meshes built once from a scene graph.
///
/// Two models are equal when they were loaded from the same path.
#[derive(Debug)]
pub struct Model {
    path: String,
    meshes: Vec<Mesh>,
}

impl Model {
    /// Builds one mesh per graph mesh reference, in traversal order.
    ///
    /// Each mesh gets its material's diffuse texture, then its specular texture,
    /// through `loader`. Texture names resolve against the directory of `path`.
    /// An index past its mesh's vertices fails the whole model.
    pub fn from_scene(
        gpu: &Rc<Gpu>,
        path: impl Into<String>,
        scene: &SceneGraph,
        loader: &mut TextureLoader,
    ) -> Result<Self> {
        let path = path.into();
        let mut meshes = Vec::new();

        for index in scene.flatten() {
            let Some(source) = scene.meshes.get(index) else {
                return Err(Error::Import {
                    path: path.clone().into(),
                    reason: format!("node references missing mesh {index}"),
                });
            };

            let vertex_count = source.positions.len();
            if let Some(&bad) = source.indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(Error::Import {
                    path: path.clone().into(),
                    reason: format!("mesh {index} index {bad} is past its {vertex_count} vertices"),
                });
            }

            let textures = match source.material.and_then(|m| scene.materials.get(m)) {
                Some(material) => load_textures(&path, material, loader)?,
                None => Vec::new(),
            };

            meshes.push(Mesh::with_textures(
                gpu,
                source.vertices(),
                source.indices.clone(),
                textures,
            )?);
        }

        log::debug!("model {path} built with {} meshes", meshes.len());
        Ok(Self { path, meshes })
    }

    /// Imports a glTF file and builds the model from it.
    #[cfg(feature = "gltf")]
    pub fn load(
        gpu: &Rc<Gpu>,
        path: impl AsRef<std::path::Path>,
        loader: &mut TextureLoader,
    ) -> Result<Self> {
        let path = path.as_ref();
        let scene = super::gltf_import::import(path)?;
        Self::from_scene(gpu, path.to_string_lossy(), &scene, loader)
    }

    /// Draws every mesh in order.
    pub fn draw(&self, mode: PrimitiveMode) {
        for mesh in &self.meshes {
            mesh.draw(mode);
        }
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

fn load_textures(
    model_path: &str,
    material: &SceneMaterial,
    loader: &mut TextureLoader,
) -> Result<Vec<Rc<Texture2D>>> {
    [&material.diffuse, &material.specular]
        .into_iter()
        .flatten()
        .map(|relative| loader.load_2d(resolve_texture_path(model_path, relative)?))
        .collect()
}

/// Replaces the file name of `model_path` with `relative`.
///
/// Everything up to and including the last `/` is kept. A path without any
/// `/` has no directory to resolve against and is rejected.
pub fn resolve_texture_path(model_path: &str, relative: &str) -> Result<String> {
    let Some(pos) = model_path.rfind('/') else {
        return Err(Error::InvalidPath {
            path: model_path.to_string(),
        });
    };
    Ok(format!("{}{relative}", &model_path[..=pos]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Severity;
    use crate::scene::{SceneMesh, SceneNode};

    fn triangle(material: Option<usize>) -> SceneMesh {
        SceneMesh {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: None,
            uvs: None,
            indices: vec![0, 1, 2],
            material,
        }
    }

    // ── path resolution ───────────────────────────────────────────────────

    #[test]
    fn resolves_next_to_model() {
        assert_eq!(
            resolve_texture_path("assets/sponza/sponza.gltf", "bricks.png").unwrap(),
            "assets/sponza/bricks.png"
        );
        assert_eq!(resolve_texture_path("/m.gltf", "a.png").unwrap(), "/a.png");
    }

    #[test]
    fn path_without_separator_is_invalid() {
        let err = resolve_texture_path("sponza.gltf", "bricks.png").unwrap_err();
        assert_eq!(err.severity(), Severity::Unexpected);
        assert_eq!(err.to_string(), "sponza.gltf is an invalid path");
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn untextured_scene_does_not_need_a_directory() {
        let (gpu, probe) = Gpu::headless();
        let mut loader = TextureLoader::new(&gpu);
        let scene = SceneGraph {
            root: SceneNode {
                meshes: vec![0, 0],
                children: Vec::new(),
            },
            meshes: vec![triangle(None)],
            materials: Vec::new(),
        };

        let model = Model::from_scene(&gpu, "tri.gltf", &scene, &mut loader).unwrap();
        assert_eq!(model.meshes().len(), 2);

        model.draw(PrimitiveMode::Triangles);
        assert_eq!(probe.draws().len(), 2);
    }

    #[test]
    fn textured_mesh_without_directory_fails() {
        let (gpu, probe) = Gpu::headless();
        let mut loader = TextureLoader::new(&gpu);
        let scene = SceneGraph {
            root: SceneNode {
                meshes: vec![0],
                children: Vec::new(),
            },
            meshes: vec![triangle(Some(0))],
            materials: vec![SceneMaterial {
                diffuse: Some("bricks.png".into()),
                specular: None,
            }],
        };

        let err = Model::from_scene(&gpu, "sponza.gltf", &scene, &mut loader).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
        assert_eq!(probe.live_textures(), 0);
    }

    #[test]
    fn dangling_mesh_reference_is_an_import_error() {
        let (gpu, _probe) = Gpu::headless();
        let mut loader = TextureLoader::new(&gpu);
        let scene = SceneGraph {
            root: SceneNode {
                meshes: vec![7],
                children: Vec::new(),
            },
            ..SceneGraph::default()
        };

        let err = Model::from_scene(&gpu, "a/b.gltf", &scene, &mut loader).unwrap_err();
        assert!(matches!(err, Error::Import { .. }));
    }

    #[test]
    fn index_past_the_vertices_is_an_import_error() {
        let (gpu, probe) = Gpu::headless();
        let mut loader = TextureLoader::new(&gpu);
        let mut broken = triangle(Some(0));
        broken.indices = vec![0, 1, 3];
        let scene = SceneGraph {
            root: SceneNode {
                meshes: vec![0, 1],
                children: Vec::new(),
            },
            meshes: vec![triangle(None), broken],
            materials: vec![SceneMaterial {
                diffuse: Some("bricks.png".into()),
                specular: None,
            }],
        };

        let err = Model::from_scene(&gpu, "a/b.gltf", &scene, &mut loader).unwrap_err();
        match err {
            Error::Import { reason, .. } => assert!(reason.contains("index 3"), "{reason}"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(probe.live_objects(), 0);
        assert!(loader.is_empty());
    }

    #[test]
    fn equality_is_by_path() {
        let (gpu, _probe) = Gpu::headless();
        let mut loader = TextureLoader::new(&gpu);
        let scene = SceneGraph::default();

        let a = Model::from_scene(&gpu, "a/b.gltf", &scene, &mut loader).unwrap();
        let b = Model::from_scene(&gpu, "a/b.gltf", &scene, &mut loader).unwrap();
        let c = Model::from_scene(&gpu, "a/c.gltf", &scene, &mut loader).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
