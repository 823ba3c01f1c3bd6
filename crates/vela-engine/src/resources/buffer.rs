use std::fmt;
use std::rc::Rc;

use bytemuck::Pod;

use crate::device::{BufferTarget, BufferUsage, GlHandle, Gpu};
use crate::error::Result;

/// Typed GPU memory block holding vertex or index data.
///
/// The data is uploaded once at construction; there is no partial update API.
/// The buffer owns exactly one native allocation and releases it on drop.
/// Moving a `GpuBuffer` transfers that ownership; duplicating it is explicit
/// via [`GpuBuffer::duplicate`].
///
/// Two buffers compare equal iff they refer to the same native handle.
pub struct GpuBuffer<T: Pod> {
    gpu: Rc<Gpu>,
    handle: GlHandle,
    target: BufferTarget,
    usage: BufferUsage,
    data: Vec<T>,
}

impl<T: Pod> GpuBuffer<T> {
    /// Allocates a native buffer and uploads `data` into it.
    pub fn new(gpu: &Rc<Gpu>, target: BufferTarget, data: Vec<T>, usage: BufferUsage) -> Result<Self> {
        let handle = upload(gpu, target, bytemuck::cast_slice(&data), usage)?;
        log::debug!(
            "buffer {handle} created ({target:?}, {} bytes)",
            std::mem::size_of_val(data.as_slice())
        );

        Ok(Self {
            gpu: Rc::clone(gpu),
            handle,
            target,
            usage,
            data,
        })
    }

    /// Static vertex buffer.
    pub fn vertices(gpu: &Rc<Gpu>, data: Vec<T>) -> Result<Self> {
        Self::new(gpu, BufferTarget::Array, data, BufferUsage::StaticDraw)
    }

    /// Static index buffer.
    pub fn indices(gpu: &Rc<Gpu>, data: Vec<T>) -> Result<Self> {
        Self::new(gpu, BufferTarget::ElementArray, data, BufferUsage::StaticDraw)
    }

    /// Creates an independent allocation with identical contents.
    pub fn duplicate(&self) -> Result<Self> {
        Self::new(&self.gpu, self.target, self.data.clone(), self.usage)
    }

    #[inline]
    pub fn handle(&self) -> GlHandle {
        self.handle
    }

    #[inline]
    pub fn target(&self) -> BufferTarget {
        self.target
    }

    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Element count.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn size_in_bytes(&self) -> usize {
        std::mem::size_of_val(self.data.as_slice())
    }

    /// CPU-side copy of the uploaded elements.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn gpu(&self) -> &Rc<Gpu> {
        &self.gpu
    }

    pub fn bind(&self) {
        self.gpu.api().bind_buffer(self.target, Some(self.handle));
    }

    pub fn unbind(&self) {
        self.gpu.api().bind_buffer(self.target, None);
    }
}

/// gen, bind, data, unbind.
fn upload(gpu: &Gpu, target: BufferTarget, bytes: &[u8], usage: BufferUsage) -> Result<GlHandle> {
    let api = gpu.api();
    let handle = api.create_buffer()?;
    api.bind_buffer(target, Some(handle));
    api.buffer_data(target, bytes, usage);
    api.bind_buffer(target, None);
    Ok(handle)
}

impl<T: Pod> Drop for GpuBuffer<T> {
    fn drop(&mut self) {
        self.gpu.api().delete_buffer(self.handle);
        log::debug!("buffer {} released", self.handle);
    }
}

impl<T: Pod> PartialEq for GpuBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl<T: Pod> Eq for GpuBuffer<T> {}

impl<T: Pod> fmt::Debug for GpuBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuBuffer")
            .field("handle", &self.handle)
            .field("target", &self.target)
            .field("usage", &self.usage)
            .field("len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn uploads_at_construction() {
        let (gpu, probe) = Gpu::headless();
        let buf = GpuBuffer::vertices(&gpu, vec![1.0f32, 2.0, 3.0]).unwrap();

        let bytes = probe.buffer_contents(buf.handle()).unwrap();
        assert_eq!(bytes, bytemuck::cast_slice::<f32, u8>(&[1.0, 2.0, 3.0]));
        assert_eq!(buf.size_in_bytes(), 12);
        assert_eq!(probe.bound_array_buffer(), None);
    }

    #[test]
    fn usage_is_forwarded() {
        let (gpu, probe) = Gpu::headless();
        let buf = GpuBuffer::new(&gpu, BufferTarget::Array, vec![0u8; 4], BufferUsage::DynamicDraw).unwrap();
        assert_eq!(probe.buffer_usage(buf.handle()), Some(BufferUsage::DynamicDraw));
    }

    // ── ownership ─────────────────────────────────────────────────────────

    #[test]
    fn move_keeps_handle_and_releases_once() {
        let (gpu, probe) = Gpu::headless();
        let buf = GpuBuffer::indices(&gpu, vec![0u32, 1, 2]).unwrap();
        let before = buf.handle();

        let moved = buf;
        assert_eq!(moved.handle(), before);
        assert_eq!(probe.live_buffers(), 1);

        drop(moved);
        assert_eq!(probe.live_buffers(), 0);
        assert!(probe.violations().is_empty());
    }

    #[test]
    fn duplicate_is_independent_allocation() {
        let (gpu, probe) = Gpu::headless();
        let a = GpuBuffer::vertices(&gpu, vec![[1.0f32, 2.0], [3.0, 4.0]]).unwrap();
        let b = a.duplicate().unwrap();

        assert_ne!(a, b);
        assert_eq!(a.data(), b.data());
        assert_eq!(probe.buffer_contents(a.handle()), probe.buffer_contents(b.handle()));

        drop(a);
        assert_eq!(probe.live_buffers(), 1);
        assert!(probe.buffer_contents(b.handle()).is_some());
    }

    #[test]
    fn equality_is_by_handle() {
        let (gpu, _probe) = Gpu::headless();
        let a = GpuBuffer::vertices(&gpu, vec![1u16]).unwrap();
        let b = GpuBuffer::vertices(&gpu, vec![1u16]).unwrap();
        assert_eq!(a, a);
        assert_ne!(a, b);
    }
}
