use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// Decoded image ready for upload.
///
/// Pixels are always tightly packed RGBA8, bottom row first (flipped relative
/// to file order, matching the native texture origin).
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    source_channels: u8,
    pixels: Vec<u8>,
}

impl DecodedImage {
    /// Channel count of every decoded image.
    pub const CHANNELS: u8 = 4;

    /// Wraps already-decoded RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * Self::CHANNELS as usize;
        if pixels.len() != expected {
            return Err(Error::Decode {
                path: "<memory>".into(),
                reason: format!("{} bytes for a {width}x{height} RGBA8 image", pixels.len()),
            });
        }
        Ok(Self {
            width,
            height,
            source_channels: Self::CHANNELS,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channel count of the stored pixels (always 4).
    #[inline]
    pub fn channels(&self) -> u8 {
        Self::CHANNELS
    }

    /// Channel count of the file before expansion to RGBA.
    #[inline]
    pub fn source_channels(&self) -> u8 {
        self.source_channels
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn size_in_bytes(&self) -> usize {
        self.pixels.len()
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("source_channels", &self.source_channels)
            .finish()
    }
}

/// Decodes an image file, flipping it vertically and expanding it to RGBA8.
pub fn decode_file(path: impl AsRef<Path>) -> Result<DecodedImage> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|e| Error::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let source_channels = image.color().channel_count();
    let rgba = image.flipv().into_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        width,
        height,
        source_channels,
        pixels: rgba.into_raw(),
    })
}
