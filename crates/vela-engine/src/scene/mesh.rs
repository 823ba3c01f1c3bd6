use std::fmt;
use std::rc::Rc;

use crate::device::{Gpu, PrimitiveMode};
use crate::error::{Error, Result};
use crate::resources::{GpuBuffer, OwnedVertexLayout, Texture2D};

use super::vertex::{Vertex, VertexFormat};

/// Highest number of textures a mesh may bind for one draw.
pub const MAX_TEXTURE_UNITS: usize = 16;

/// Indexed geometry plus the textures sampled while drawing it.
///
/// Textures bind positionally: the texture at index `i` goes to unit `i`.
/// The mesh shares its textures with the loader cache and owns everything
/// else.
pub struct Mesh<V: VertexFormat = Vertex> {
    layout: OwnedVertexLayout<V, u32>,
    textures: Vec<Rc<Texture2D>>,
}

impl<V: VertexFormat> Mesh<V> {
    /// Uploads `vertices` and `indices` into a new untextured mesh.
    pub fn new(gpu: &Rc<Gpu>, vertices: Vec<V>, indices: Vec<u32>) -> Result<Self> {
        Self::with_textures(gpu, vertices, indices, Vec::new())
    }

    pub fn with_textures(
        gpu: &Rc<Gpu>,
        vertices: Vec<V>,
        indices: Vec<u32>,
        textures: Vec<Rc<Texture2D>>,
    ) -> Result<Self> {
        check_texture_count(textures.len())?;
        let layout = OwnedVertexLayout::new(
            GpuBuffer::vertices(gpu, vertices)?,
            GpuBuffer::indices(gpu, indices)?,
            V::attributes(),
        )?;
        Ok(Self { layout, textures })
    }

    /// Replaces the bound textures. The old list is kept on failure.
    pub fn set_textures(&mut self, textures: Vec<Rc<Texture2D>>) -> Result<()> {
        check_texture_count(textures.len())?;
        self.textures = textures;
        Ok(())
    }

    pub fn textures(&self) -> &[Rc<Texture2D>] {
        &self.textures
    }

    pub fn layout(&self) -> &OwnedVertexLayout<V, u32> {
        &self.layout
    }

    pub fn vertices(&self) -> &[V] {
        self.layout.vertex_buffer().data()
    }

    pub fn indices(&self) -> &[u32] {
        self.layout.index_buffer().data()
    }

    /// Binds textures, draws every index, then unbinds in reverse.
    ///
    /// Texture units are unbound from the last to the first, so unit 0 is the
    /// active unit afterwards.
    pub fn draw(&self, mode: PrimitiveMode) {
        for (unit, texture) in self.textures.iter().enumerate() {
            texture.bind(unit as u32);
        }

        self.layout.bind();
        self.layout.draw(mode);
        self.layout.unbind();

        for (unit, texture) in self.textures.iter().enumerate().rev() {
            texture.unbind(unit as u32);
        }
    }

    /// New buffers and vertex array with the same contents; textures are shared.
    pub fn duplicate(&self) -> Result<Self> {
        Ok(Self {
            layout: self.layout.duplicate()?,
            textures: self.textures.clone(),
        })
    }
}

fn check_texture_count(count: usize) -> Result<()> {
    if count > MAX_TEXTURE_UNITS {
        return Err(Error::TextureCount {
            count,
            max: MAX_TEXTURE_UNITS,
        });
    }
    Ok(())
}

impl<V: VertexFormat> fmt::Debug for Mesh<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("layout", &self.layout.handle())
            .field("indices", &self.layout.index_count())
            .field("textures", &self.textures.len())
            .finish()
    }
}
