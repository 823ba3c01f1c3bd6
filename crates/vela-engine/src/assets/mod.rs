//! Asset boundary: source files, image decoding and the load caches.
//!
//! The caches are plain owned values. The application creates them once the
//! graphics context exists and drops them before the context goes away.

mod decode;
mod io;
mod shader_loader;
mod texture_loader;

pub use decode::{decode_file, DecodedImage};
pub use io::read_source;
pub use shader_loader::{ShaderLoader, SHADER_VERSION};
pub use texture_loader::TextureLoader;
