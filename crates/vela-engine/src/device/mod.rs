//! Graphics device layer.
//!
//! This module is responsible for:
//! - the `Backend` seam between the resource model and a native graphics API
//! - the `glow` OpenGL backend used by the window runtime
//! - the in-memory headless backend used by tests and offline runs
//! - `Gpu`, the shared per-context handle every resource keeps

mod backend;
mod glow_backend;
mod gpu;
mod headless;
mod types;

pub use backend::Backend;
pub use glow_backend::GlowBackend;
pub use gpu::{Gpu, GpuInit};
pub use headless::{
    CapturedAttribute, DrawCall, HeadlessBackend, HeadlessProbe, TextureSnapshot, UniformWrite,
    VertexArraySnapshot,
};
pub use types::{
    AttributeKind, BufferTarget, BufferUsage, Capability, ClearMask, GlHandle, IndexType,
    PrimitiveMode, Sampling, ShaderStage, TextureFilter, TextureWrap, UniformLocation,
    UniformValue, VertexAttribute,
};
