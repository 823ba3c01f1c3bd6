//! Pre-parsed scene description consumed by [`Model`](super::Model).
//!
//! Importers fill these types; the engine only flattens them.

use super::vertex::Vertex;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGraph {
    pub root: SceneNode,
    pub meshes: Vec<SceneMesh>,
    pub materials: Vec<SceneMaterial>,
}

/// Node of the hierarchy. `meshes` index into [`SceneGraph::meshes`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneNode {
    pub meshes: Vec<usize>,
    pub children: Vec<SceneNode>,
}

/// Triangulated geometry. `normals` and `uvs` run parallel to `positions`
/// when present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub uvs: Option<Vec<[f32; 2]>>,
    pub indices: Vec<u32>,
    /// Index into [`SceneGraph::materials`].
    pub material: Option<usize>,
}

/// Texture references, relative to the scene file's directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneMaterial {
    pub diffuse: Option<String>,
    pub specular: Option<String>,
}

impl SceneGraph {
    /// Mesh indices in draw order: a node's own meshes, then its children,
    /// depth first.
    pub fn flatten(&self) -> Vec<usize> {
        let mut order = Vec::new();
        collect(&self.root, &mut order);
        order
    }
}

fn collect(node: &SceneNode, order: &mut Vec<usize>) {
    order.extend_from_slice(&node.meshes);
    for child in &node.children {
        collect(child, order);
    }
}

impl SceneMesh {
    /// Interleaves the attribute streams. Missing uvs become `(0, 0)`,
    /// missing normals `+Z`.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let normal = self
                    .normals
                    .as_ref()
                    .and_then(|n| n.get(i).copied())
                    .unwrap_or([0.0, 0.0, 1.0]);
                let uv = self
                    .uvs
                    .as_ref()
                    .and_then(|t| t.get(i).copied())
                    .unwrap_or([0.0, 0.0]);
                Vertex::new(position, normal, uv)
            })
            .collect()
    }
}
