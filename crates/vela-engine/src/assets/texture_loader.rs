use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::device::Gpu;
use crate::error::Result;
use crate::resources::Texture2D;

/// Cache of 2D textures keyed by path.
///
/// This is the sanctioned way to obtain a shared texture: a path decodes and
/// uploads once, and every later load hands back the same `Rc`.
pub struct TextureLoader {
    gpu: Rc<Gpu>,
    textures: HashMap<PathBuf, Rc<Texture2D>>,
    total_bytes: usize,
}

impl TextureLoader {
    pub fn new(gpu: &Rc<Gpu>) -> Self {
        Self {
            gpu: Rc::clone(gpu),
            textures: HashMap::new(),
            total_bytes: 0,
        }
    }

    /// Returns the cached texture for `path`, decoding and uploading it on a miss.
    pub fn load_2d(&mut self, path: impl AsRef<Path>) -> Result<Rc<Texture2D>> {
        let path = path.as_ref();
        if let Some(texture) = self.textures.get(path) {
            return Ok(Rc::clone(texture));
        }

        let texture = Rc::new(Texture2D::from_file(&self.gpu, path)?);
        self.total_bytes += texture.size_in_bytes();
        log::info!(
            "loaded texture {} [{} bytes]",
            path.display(),
            texture.size_in_bytes()
        );

        self.textures.insert(path.to_path_buf(), Rc::clone(&texture));
        Ok(texture)
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.textures.contains_key(path.as_ref())
    }

    /// Bytes of pixel data uploaded through this cache, each texture counted once.
    pub fn total_bytes_loaded(&self) -> usize {
        self.total_bytes
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Drops every cached entry. Textures still referenced by a mesh stay alive
    /// through that mesh. The byte counter is kept.
    pub fn clear(&mut self) {
        log::info!("clearing {} cached textures", self.textures.len());
        self.textures.clear();
    }
}
