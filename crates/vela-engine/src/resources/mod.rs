//! GPU resource wrappers.
//!
//! Each wrapper owns exactly one native object and releases it on drop.
//! Rust moves transfer that ownership; copies are explicit through
//! `duplicate()`, which allocates a fresh native object with the same
//! observable state.

mod buffer;
mod layout;
mod program;
mod shader;
mod texture;
mod uniform;

pub use buffer::GpuBuffer;
pub use layout::{IndexElement, OwnedVertexLayout, ReferencedVertexLayout};
pub use program::Program;
pub use shader::Shader;
pub use texture::Texture2D;
pub use uniform::{ArrayElement, Uniform};

pub use crate::device::VertexAttribute;
