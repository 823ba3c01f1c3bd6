//! Vela engine crate.
//!
//! A small forward renderer on OpenGL 4.0 core: GPU resource wrappers with
//! owned lifetimes, asset caches, meshes and models, Phong-family materials
//! with light lists, an FPS camera, and the window runtime driving it all.

pub mod device;
pub mod resources;
pub mod assets;
pub mod scene;
pub mod material;
pub mod camera;

pub mod input;
pub mod time;
pub mod core;
pub mod window;

pub mod logging;

mod error;

pub use error::{Error, Result, Severity};
