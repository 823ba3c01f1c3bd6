use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};

use crate::device::VertexAttribute;

/// Vertex record with a fixed attribute layout.
///
/// Attribute slots are part of the contract with the shader sources:
/// slot 0 is always the position.
pub trait VertexFormat: Pod {
    fn attributes() -> Vec<VertexAttribute>;
}

// ── lit vertex ────────────────────────────────────────────────────────────

/// Position, normal and texture coordinate. Slots 0, 1, 2.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, normal, uv }
    }
}

impl VertexFormat for Vertex {
    fn attributes() -> Vec<VertexAttribute> {
        let stride = size_of::<Self>() as u32;
        vec![
            VertexAttribute::float(0, 3, stride, offset_of!(Self, position) as u32),
            VertexAttribute::float(1, 3, stride, offset_of!(Self, normal) as u32),
            VertexAttribute::float(2, 2, stride, offset_of!(Self, uv) as u32),
        ]
    }
}

// ── colored vertex ────────────────────────────────────────────────────────

/// Position and per-vertex color. Slots 0, 1.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl ColorVertex {
    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }
}

impl VertexFormat for ColorVertex {
    fn attributes() -> Vec<VertexAttribute> {
        let stride = size_of::<Self>() as u32;
        vec![
            VertexAttribute::float(0, 3, stride, offset_of!(Self, position) as u32),
            VertexAttribute::float(1, 3, stride, offset_of!(Self, color) as u32),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_is_tightly_packed() {
        let attrs = Vertex::attributes();
        assert_eq!(size_of::<Vertex>(), 32);
        assert!(attrs.iter().all(|a| a.stride == 32));
        assert_eq!(
            attrs.iter().map(|a| a.offset).collect::<Vec<_>>(),
            vec![0, 12, 24]
        );
    }

    #[test]
    fn color_vertex_layout() {
        let attrs = ColorVertex::attributes();
        assert_eq!(size_of::<ColorVertex>(), 24);
        assert_eq!(attrs[1].index, 1);
        assert_eq!(attrs[1].offset, 12);
        assert_eq!(attrs[1].components, 3);
    }
}
