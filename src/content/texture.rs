//! Texture content - decoded image pixels
//!
//! Payloads are encoded image bytes with no structured wrapper: PNG,
//! JPEG, and BMP are accepted on load; saving always re-encodes PNG.
//! The decoded RGBA buffer is the resource the release hook frees.

use super::{AssetKind, ContentError};

/// A decoded image held by the texture registry.
///
/// Stored as tightly packed RGBA8, row-major. Equality is dimensions plus
/// pixel bytes, which is what payload round-trips preserve (the encoded
/// container may differ byte-for-byte, the pixels never do).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Texture {
    /// Wrap an existing RGBA8 buffer. The buffer length must be
    /// `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ContentError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(ContentError::Validation(format!(
                "pixel buffer is {} bytes, {}x{} RGBA needs {}",
                pixels.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The RGBA8 buffer; empty once the texture has been released.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether the pixel buffer has been released (or never loaded).
    pub fn is_released(&self) -> bool {
        self.pixels.is_empty()
    }
}

impl AssetKind for Texture {
    const KIND: &'static str = "texture";
    const SUBDIR: &'static str = "textures";
    const EXT: &'static str = "png";

    fn raw_load(&mut self, bytes: &[u8]) -> Result<(), ContentError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| ContentError::Decode(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        self.width = rgba.width();
        self.height = rgba.height();
        self.pixels = rgba.into_raw();
        Ok(())
    }

    fn save_data(&self) -> Result<Vec<u8>, ContentError> {
        use image::ImageEncoder;

        let expected = self.width as usize * self.height as usize * 4;
        if self.pixels.len() != expected {
            return Err(ContentError::Encode(format!(
                "pixel buffer is {} bytes, {}x{} RGBA needs {} (released?)",
                self.pixels.len(),
                self.width,
                self.height,
                expected
            )));
        }

        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(
                &self.pixels,
                self.width,
                self.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| ContentError::Encode(e.to_string()))?;
        Ok(out)
    }

    fn raw_unload(&mut self) {
        self.pixels = Vec::new();
    }
}
