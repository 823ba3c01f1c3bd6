use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::assets::{decode_file, DecodedImage};
use crate::device::{GlHandle, Gpu, Sampling};
use crate::error::Result;

/// 2D texture plus the decoded pixels it was uploaded from.
///
/// Default sampling repeats in both directions with trilinear minification.
/// Mipmaps are generated at upload.
pub struct Texture2D {
    gpu: Rc<Gpu>,
    handle: GlHandle,
    path: PathBuf,
    sampling: Sampling,
    image: DecodedImage,
}

impl Texture2D {
    /// Decodes `path` and uploads it.
    pub fn from_file(gpu: &Rc<Gpu>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = decode_file(path)?;
        Self::from_image(gpu, path, image)
    }

    /// Uploads an already-decoded image. `path` only identifies the texture.
    pub fn from_image(gpu: &Rc<Gpu>, path: impl Into<PathBuf>, image: DecodedImage) -> Result<Self> {
        Self::with_sampling(gpu, path, image, Sampling::default())
    }

    pub fn with_sampling(
        gpu: &Rc<Gpu>,
        path: impl Into<PathBuf>,
        image: DecodedImage,
        sampling: Sampling,
    ) -> Result<Self> {
        let path = path.into();
        let handle = upload(gpu, &image, sampling)?;
        log::debug!(
            "texture {handle} created from {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );

        Ok(Self {
            gpu: Rc::clone(gpu),
            handle,
            path,
            sampling,
            image,
        })
    }

    /// Uploads the retained pixels into a new native texture.
    pub fn duplicate(&self) -> Result<Self> {
        Self::with_sampling(&self.gpu, self.path.clone(), self.image.clone(), self.sampling)
    }

    /// Binds to texture unit `unit`. Leaves `unit` as the active unit.
    pub fn bind(&self, unit: u32) {
        let api = self.gpu.api();
        api.active_texture(unit);
        api.bind_texture_2d(Some(self.handle));
    }

    /// Clears texture unit `unit`. Leaves `unit` as the active unit.
    pub fn unbind(&self, unit: u32) {
        let api = self.gpu.api();
        api.active_texture(unit);
        api.bind_texture_2d(None);
    }

    /// Replaces wrap/filter state. Uses the active unit and puts back whatever
    /// texture was bound there.
    pub fn set_sampling(&mut self, sampling: Sampling) {
        let api = self.gpu.api();
        let previous = api.texture_binding_2d();
        api.bind_texture_2d(Some(self.handle));
        api.texture_sampling_2d(sampling);
        api.bind_texture_2d(previous);
        self.sampling = sampling;
    }

    #[inline]
    pub fn handle(&self) -> GlHandle {
        self.handle
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Channels of the uploaded pixels (always RGBA).
    pub fn channels(&self) -> u8 {
        self.image.channels()
    }

    /// `width * height * channels`.
    pub fn size_in_bytes(&self) -> usize {
        self.image.size_in_bytes()
    }

    pub fn image(&self) -> &DecodedImage {
        &self.image
    }
}

fn upload(gpu: &Gpu, image: &DecodedImage, sampling: Sampling) -> Result<GlHandle> {
    let api = gpu.api();
    let handle = api.create_texture()?;
    let previous = api.texture_binding_2d();
    api.bind_texture_2d(Some(handle));
    api.texture_sampling_2d(sampling);
    api.texture_image_2d_rgba8(image.width(), image.height(), image.pixels());
    api.generate_mipmap_2d();
    api.bind_texture_2d(previous);
    Ok(handle)
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        self.gpu.api().delete_texture(self.handle);
        log::debug!("texture {} released", self.handle);
    }
}

impl PartialEq for Texture2D {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Texture2D {}

impl fmt::Debug for Texture2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture2D")
            .field("handle", &self.handle)
            .field("path", &self.path)
            .field("size", &(self.width(), self.height()))
            .finish()
    }
}
