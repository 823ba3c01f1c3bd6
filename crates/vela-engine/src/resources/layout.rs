use std::fmt;
use std::rc::Rc;

use bytemuck::Pod;

use crate::device::{BufferTarget, GlHandle, Gpu, IndexType, PrimitiveMode, VertexAttribute};
use crate::error::Result;

use super::buffer::GpuBuffer;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// Element type usable in an index buffer.
///
/// Implemented for `u8`, `u16` and `u32` only; any other width is rejected at
/// compile time.
pub trait IndexElement: Pod + sealed::Sealed {
    const INDEX_TYPE: IndexType;
}

impl IndexElement for u8 {
    const INDEX_TYPE: IndexType = IndexType::UnsignedByte;
}

impl IndexElement for u16 {
    const INDEX_TYPE: IndexType = IndexType::UnsignedShort;
}

impl IndexElement for u32 {
    const INDEX_TYPE: IndexType = IndexType::UnsignedInt;
}

// ── shared native object ──────────────────────────────────────────────────

/// Native vertex array plus the descriptors it was built from.
struct LayoutObject {
    gpu: Rc<Gpu>,
    handle: GlHandle,
    attributes: Vec<VertexAttribute>,
    index_count: usize,
    index_type: IndexType,
}

impl LayoutObject {
    /// Records `attributes` against `vbo` and associates `ebo`.
    ///
    /// Order: bind array, bind vertex buffer, register attributes, unbind vertex
    /// buffer, bind index buffer, unbind array, unbind index buffer. Unbinding
    /// the index buffer while the array is still bound would detach it.
    fn build<V: Pod, I: IndexElement>(
        vbo: &GpuBuffer<V>,
        ebo: &GpuBuffer<I>,
        attributes: Vec<VertexAttribute>,
    ) -> Result<Self> {
        debug_assert_eq!(vbo.target(), BufferTarget::Array);
        debug_assert_eq!(ebo.target(), BufferTarget::ElementArray);

        let gpu = Rc::clone(vbo.gpu());
        let api = gpu.api();

        let handle = api.create_vertex_array()?;
        api.bind_vertex_array(Some(handle));
        vbo.bind();
        for attribute in &attributes {
            api.vertex_attrib_pointer(attribute);
            api.enable_vertex_attrib_array(attribute.index);
        }
        vbo.unbind();
        ebo.bind();
        api.bind_vertex_array(None);
        ebo.unbind();

        log::debug!(
            "vertex array {handle} created ({} attributes, {} indices)",
            attributes.len(),
            ebo.len()
        );

        Ok(Self {
            gpu,
            handle,
            attributes,
            index_count: ebo.len(),
            index_type: I::INDEX_TYPE,
        })
    }

    fn bind(&self) {
        self.gpu.api().bind_vertex_array(Some(self.handle));
    }

    fn unbind(&self) {
        self.gpu.api().bind_vertex_array(None);
    }

    fn draw(&self, mode: PrimitiveMode) {
        self.gpu
            .api()
            .draw_elements(mode, self.index_count, self.index_type);
    }
}

impl Drop for LayoutObject {
    fn drop(&mut self) {
        self.gpu.api().delete_vertex_array(self.handle);
        log::debug!("vertex array {} released", self.handle);
    }
}

// ── owning variant ────────────────────────────────────────────────────────

/// Vertex layout object that owns its vertex and index buffers.
///
/// Duplicating it duplicates both buffers and replays the descriptors against
/// the new allocations.
pub struct OwnedVertexLayout<V: Pod, I: IndexElement> {
    object: LayoutObject,
    vbo: GpuBuffer<V>,
    ebo: GpuBuffer<I>,
}

impl<V: Pod, I: IndexElement> OwnedVertexLayout<V, I> {
    pub fn new(vbo: GpuBuffer<V>, ebo: GpuBuffer<I>, attributes: Vec<VertexAttribute>) -> Result<Self> {
        let object = LayoutObject::build(&vbo, &ebo, attributes)?;
        Ok(Self { object, vbo, ebo })
    }

    pub fn duplicate(&self) -> Result<Self> {
        Self::new(
            self.vbo.duplicate()?,
            self.ebo.duplicate()?,
            self.object.attributes.clone(),
        )
    }

    pub fn handle(&self) -> GlHandle {
        self.object.handle
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.object.attributes
    }

    pub fn index_count(&self) -> usize {
        self.object.index_count
    }

    pub fn index_type(&self) -> IndexType {
        self.object.index_type
    }

    pub fn vertex_buffer(&self) -> &GpuBuffer<V> {
        &self.vbo
    }

    pub fn index_buffer(&self) -> &GpuBuffer<I> {
        &self.ebo
    }

    pub fn bind(&self) {
        self.object.bind();
    }

    pub fn unbind(&self) {
        self.object.unbind();
    }

    /// Issues an indexed draw over every index. The layout must be bound.
    pub fn draw(&self, mode: PrimitiveMode) {
        self.object.draw(mode);
    }
}

impl<V: Pod, I: IndexElement> fmt::Debug for OwnedVertexLayout<V, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedVertexLayout")
            .field("handle", &self.object.handle)
            .field("vbo", &self.vbo)
            .field("ebo", &self.ebo)
            .finish()
    }
}

// ── referencing variant ───────────────────────────────────────────────────

/// Vertex layout object borrowing buffers owned elsewhere.
///
/// Cheap to duplicate (only the vertex array is rebuilt). The borrow ties the
/// layout's lifetime to the buffers, so it can never outlive them.
pub struct ReferencedVertexLayout<'b, V: Pod, I: IndexElement> {
    object: LayoutObject,
    vbo: &'b GpuBuffer<V>,
    ebo: &'b GpuBuffer<I>,
}

impl<'b, V: Pod, I: IndexElement> ReferencedVertexLayout<'b, V, I> {
    pub fn new(
        vbo: &'b GpuBuffer<V>,
        ebo: &'b GpuBuffer<I>,
        attributes: Vec<VertexAttribute>,
    ) -> Result<Self> {
        let object = LayoutObject::build(vbo, ebo, attributes)?;
        Ok(Self { object, vbo, ebo })
    }

    /// Rebuilds the vertex array against the same buffers.
    pub fn duplicate(&self) -> Result<Self> {
        Self::new(self.vbo, self.ebo, self.object.attributes.clone())
    }

    pub fn handle(&self) -> GlHandle {
        self.object.handle
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.object.attributes
    }

    pub fn index_count(&self) -> usize {
        self.object.index_count
    }

    pub fn index_type(&self) -> IndexType {
        self.object.index_type
    }

    pub fn vertex_buffer(&self) -> &'b GpuBuffer<V> {
        self.vbo
    }

    pub fn index_buffer(&self) -> &'b GpuBuffer<I> {
        self.ebo
    }

    pub fn bind(&self) {
        self.object.bind();
    }

    pub fn unbind(&self) {
        self.object.unbind();
    }

    /// Issues an indexed draw over every index. The layout must be bound.
    pub fn draw(&self, mode: PrimitiveMode) {
        self.object.draw(mode);
    }
}

impl<V: Pod, I: IndexElement> fmt::Debug for ReferencedVertexLayout<'_, V, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferencedVertexLayout")
            .field("handle", &self.object.handle)
            .field("vbo", &self.vbo.handle())
            .field("ebo", &self.ebo.handle())
            .finish()
    }
}
