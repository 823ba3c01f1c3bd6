//! glTF import into a [`SceneGraph`].
//!
//! Every primitive of a glTF mesh becomes one [`SceneMesh`]. Node transforms
//! are not applied. Only base color textures with an external URI are
//! referenced; glTF core has no specular map.

use std::path::Path;

use gltf::mesh::Mode;

use crate::error::{Error, Result};

use super::graph::{SceneGraph, SceneMaterial, SceneMesh, SceneNode};

/// Parses `path` and its buffers. Textures are left for the texture cache.
pub fn import(path: &Path) -> Result<SceneGraph> {
    let fail = |reason: String| Error::Import {
        path: path.to_path_buf(),
        reason,
    };

    let gltf::Gltf { document, blob } = gltf::Gltf::open(path).map_err(|e| fail(e.to_string()))?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob).map_err(|e| fail(e.to_string()))?;

    // glTF mesh index -> indices of the SceneMeshes made from its primitives.
    let mut primitive_map = Vec::with_capacity(document.meshes().len());
    let mut meshes = Vec::new();

    for mesh in document.meshes() {
        let mut ids = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != Mode::Triangles {
                log::warn!(
                    "{}: skipping {:?} primitive of mesh {}",
                    path.display(),
                    primitive.mode(),
                    mesh.index()
                );
                continue;
            }

            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let Some(positions) = reader.read_positions() else {
                return Err(fail(format!("mesh {} has a primitive without positions", mesh.index())));
            };
            let positions: Vec<[f32; 3]> = positions.collect();

            let indices = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            // glTF puts the uv origin at the top left; textures are uploaded
            // bottom row first.
            let uvs = reader
                .read_tex_coords(0)
                .map(|uvs| uvs.into_f32().map(|[u, v]| [u, 1.0 - v]).collect());

            ids.push(meshes.len());
            meshes.push(SceneMesh {
                positions,
                normals: reader.read_normals().map(Iterator::collect),
                uvs,
                indices,
                material: primitive.material().index(),
            });
        }
        primitive_map.push(ids);
    }

    let materials = document
        .materials()
        .map(|material| SceneMaterial {
            diffuse: material
                .pbr_metallic_roughness()
                .base_color_texture()
                .and_then(|info| match info.texture().source().source() {
                    gltf::image::Source::Uri { uri, .. } => Some(uri.to_string()),
                    gltf::image::Source::View { .. } => None,
                }),
            specular: None,
        })
        .collect();

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| fail("file contains no scene".into()))?;

    let root = SceneNode {
        meshes: Vec::new(),
        children: scene.nodes().map(|n| convert_node(&n, &primitive_map)).collect(),
    };

    log::debug!(
        "{}: imported {} meshes, {} materials",
        path.display(),
        meshes.len(),
        document.materials().len()
    );

    Ok(SceneGraph {
        root,
        meshes,
        materials,
    })
}

fn convert_node(node: &gltf::Node<'_>, primitive_map: &[Vec<usize>]) -> SceneNode {
    SceneNode {
        meshes: node
            .mesh()
            .map(|m| primitive_map[m.index()].clone())
            .unwrap_or_default(),
        children: node
            .children()
            .map(|child| convert_node(&child, primitive_map))
            .collect(),
    }
}
