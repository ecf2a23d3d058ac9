//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which owns a 2D RGBA texture on
//! the GPU side. Decoding image files is left to the `image` crate.

use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, GenericImageView};

use super::{Device, GlDevice};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    Repeat = glow::REPEAT as isize,
    MirroredRepeat = glow::MIRRORED_REPEAT as isize,
    ClampToEdge = glow::CLAMP_TO_EDGE as isize,
}

impl TextureWrap {
    pub const fn gl_enum(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

/// Sampling parameters applied when a texture is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureOptions {
    pub wrap: TextureWrap,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    /// Generate a full mipmap chain; the minification filter then samples between levels.
    pub mipmaps: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            wrap: TextureWrap::Repeat,
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            mipmaps: true,
        }
    }
}

/// Represents a 2D texture stored on the GPU side.
pub struct Texture<D: Device = GlDevice> {
    device: Arc<D>,
    id: D::Texture,
    width: u32,
    height: u32,
}

impl<D: Device> Texture<D> {
    /// Loads and decodes an image file with the default options.
    pub fn from_file(device: &Arc<D>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| Error::Resource {
            name: path.display().to_string(),
            reason: e.to_string(),
        })?;
        log::debug!("Decoded {} ({}x{})", path.display(), image.width(), image.height());
        Self::from_image(device, &image, &TextureOptions::default())
    }

    /// Creates a new texture from the given [`image::DynamicImage`].
    pub fn from_image(device: &Arc<D>, image: &DynamicImage, options: &TextureOptions) -> Result<Self> {
        let (width, height) = image.dimensions();
        let data = image.to_rgba8().into_raw();
        Self::from_pixels(device, width, height, &data, options)
    }

    /// Creates a new texture from raw, tightly packed RGBA8 data.
    pub fn from_pixels(
        device: &Arc<D>,
        width: u32,
        height: u32,
        rgba: &[u8],
        options: &TextureOptions,
    ) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(Error::Resource {
                name: format!("{width}x{height} pixel data"),
                reason: format!("expected {expected} bytes, got {}", rgba.len()),
            });
        }

        let id = device
            .create_texture_2d(width, height, rgba, options)
            .map_err(Error::Device)?;

        Ok(Self {
            device: Arc::clone(device),
            id,
            width,
            height,
        })
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn handle(&self) -> D::Texture {
        self.id
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind(&self, unit: u32) {
        self.device.bind_texture(self.id, unit);
    }
}

impl<D: Device> Drop for Texture<D> {
    fn drop(&mut self) {
        self.device.delete_texture(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abs::mock::MockDevice;

    #[test]
    fn test_from_image_uploads_rgba() {
        let device = Arc::new(MockDevice::default());
        let mut image = image::RgbImage::new(2, 1);
        image.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        image.put_pixel(1, 0, image::Rgb([0, 0, 255]));

        let texture =
            Texture::from_image(&device, &DynamicImage::ImageRgb8(image), &TextureOptions::default()).unwrap();
        assert_eq!((texture.width(), texture.height()), (2, 1));

        let uploaded = device.texture(texture.handle()).unwrap();
        assert_eq!(uploaded.pixels, vec![255, 0, 0, 255, 0, 0, 255, 255]);
        assert_eq!(uploaded.options.wrap, TextureWrap::Repeat);

        texture.bind(3);
        assert_eq!(device.texture_unit(3), Some(texture.handle()));

        drop(texture);
        assert_eq!(device.live_textures(), 0);
    }

    #[test]
    fn test_wrong_pixel_count_is_rejected() {
        let device = Arc::new(MockDevice::default());
        let result = Texture::from_pixels(&device, 2, 2, &[0; 15], &TextureOptions::default());
        assert!(matches!(result, Err(Error::Resource { .. })));
        assert_eq!(device.live_textures(), 0);
    }

    #[test]
    fn test_missing_file_is_resource_error() {
        let device = Arc::new(MockDevice::default());
        let result = Texture::from_file(&device, "/nonexistent/definitely/missing.png");
        match result {
            Err(Error::Resource { name, .. }) => assert!(name.ends_with("missing.png")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("loading a missing file succeeded"),
        }
    }
}
