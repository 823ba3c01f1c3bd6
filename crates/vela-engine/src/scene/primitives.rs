//! Built-in meshes.

use std::rc::Rc;

use crate::device::Gpu;
use crate::error::Result;

use super::mesh::Mesh;
use super::vertex::{ColorVertex, Vertex};

const FACING: [f32; 3] = [0.0, 0.0, 1.0];

pub const TRIANGLE_VERTICES: [Vertex; 3] = [
    Vertex::new([-1.0, -1.0, 0.0], FACING, [0.0, 0.0]),
    Vertex::new([1.0, -1.0, 0.0], FACING, [1.0, 0.0]),
    Vertex::new([0.5, 1.0, 0.0], FACING, [0.5, 1.0]),
];

pub const COLORED_TRIANGLE_VERTICES: [ColorVertex; 3] = [
    ColorVertex::new([-1.0, -1.0, 0.0], [1.0, 0.0, 0.0]),
    ColorVertex::new([1.0, -1.0, 0.0], [0.0, 1.0, 0.0]),
    ColorVertex::new([0.5, 1.0, 0.0], [0.0, 0.0, 1.0]),
];

pub const QUAD_VERTICES: [Vertex; 4] = [
    Vertex::new([-1.0, -1.0, 0.0], FACING, [0.0, 0.0]),
    Vertex::new([1.0, -1.0, 0.0], FACING, [1.0, 0.0]),
    Vertex::new([-1.0, 1.0, 0.0], FACING, [0.0, 1.0]),
    Vertex::new([1.0, 1.0, 0.0], FACING, [1.0, 1.0]),
];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 1, 3];

/// Normal and counter-clockwise corners of each cube face.
const CUBE_FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
    // front
    (
        [0.0, 0.0, 1.0],
        [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
    ),
    // back
    (
        [0.0, 0.0, -1.0],
        [[-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0]],
    ),
    // top
    (
        [0.0, 1.0, 0.0],
        [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]],
    ),
    // bottom
    (
        [0.0, -1.0, 0.0],
        [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
    ),
    // right
    (
        [1.0, 0.0, 0.0],
        [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]],
    ),
    // left
    (
        [-1.0, 0.0, 0.0],
        [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
    ),
];

const FACE_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

pub fn triangle(gpu: &Rc<Gpu>) -> Result<Mesh<Vertex>> {
    Mesh::new(gpu, TRIANGLE_VERTICES.to_vec(), vec![0, 1, 2])
}

/// Red, green and blue corners.
pub fn colored_triangle(gpu: &Rc<Gpu>) -> Result<Mesh<ColorVertex>> {
    Mesh::new(gpu, COLORED_TRIANGLE_VERTICES.to_vec(), vec![0, 1, 2])
}

pub fn quad(gpu: &Rc<Gpu>) -> Result<Mesh<Vertex>> {
    Mesh::new(gpu, QUAD_VERTICES.to_vec(), QUAD_INDICES.to_vec())
}

/// Unit-extent cube (-1..1) with per-face normals and uvs.
pub fn cube(gpu: &Rc<Gpu>) -> Result<Mesh<Vertex>> {
    let (vertices, indices) = cube_geometry();
    Mesh::new(gpu, vertices, indices)
}

fn cube_geometry() -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, corners) in CUBE_FACES {
        let base = vertices.len() as u32;
        for (corner, uv) in corners.into_iter().zip(FACE_UVS) {
            vertices.push(Vertex::new(corner, normal, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn cube_has_four_vertices_per_face() {
        let (vertices, indices) = cube_geometry();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert_eq!(&indices[6..12], &[4, 5, 6, 4, 6, 7]);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn cube_faces_wind_outward() {
        let (vertices, indices) = cube_geometry();
        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a).normalize();
            let stored = Vec3::from(vertices[tri[0] as usize].normal);
            assert!((face_normal - stored).length() < 1e-5, "{tri:?}");
        }
    }

    #[test]
    fn uploads_primitives() {
        let (gpu, probe) = Gpu::headless();
        let meshes = (
            triangle(&gpu).unwrap(),
            colored_triangle(&gpu).unwrap(),
            quad(&gpu).unwrap(),
            cube(&gpu).unwrap(),
        );

        assert_eq!(meshes.0.indices(), &[0, 1, 2]);
        assert_eq!(meshes.1.vertices()[2].color, [0.0, 0.0, 1.0]);
        assert_eq!(meshes.2.indices(), &QUAD_INDICES);
        assert_eq!(meshes.3.vertices().len(), 24);
        assert_eq!(probe.live_vertex_arrays(), 4);
    }
}
