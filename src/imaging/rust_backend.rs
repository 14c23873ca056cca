//! Pure Rust codec.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` |
//! | Render | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode lossless | `image::codecs::png::PngEncoder` |
//! | Encode lossy | `image::codecs::jpeg::JpegEncoder` (flattened to RGB8) |
//! | Pixel layout | `DynamicImage` variant |

use super::backend::{CodecError, ImageCodec, PixelLayout};
use super::calculations::Size;
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Pure Rust codec using the `image` crate ecosystem.
///
/// Buffers are [`DynamicImage`]s. See the [module docs](self) for the
/// crate-to-operation mapping.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }

    /// Load and decode a source image from disk.
    pub fn open(&self, path: &Path) -> Result<DynamicImage, CodecError> {
        ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| {
                CodecError::DecodeFailed(format!("Failed to decode {}: {}", path.display(), e))
            })
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Bring float buffers down to 16 bits; PNG has no float sample format.
fn png_compatible(img: &DynamicImage) -> Option<DynamicImage> {
    match img {
        DynamicImage::ImageRgb32F(_) => Some(DynamicImage::ImageRgb16(img.to_rgb16())),
        DynamicImage::ImageRgba32F(_) => Some(DynamicImage::ImageRgba16(img.to_rgba16())),
        _ => None,
    }
}

impl ImageCodec for RustCodec {
    type Buffer = DynamicImage;

    fn dimensions(&self, buffer: &DynamicImage) -> Size {
        Size::from((buffer.width(), buffer.height()))
    }

    fn pixel_layout(&self, buffer: &DynamicImage) -> Option<PixelLayout> {
        match buffer {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgb16(_)
            | DynamicImage::ImageRgb32F(_) => Some(PixelLayout::None),
            DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLumaA16(_)
            | DynamicImage::ImageRgba8(_)
            | DynamicImage::ImageRgba16(_)
            | DynamicImage::ImageRgba32F(_) => Some(PixelLayout::Last),
            _ => None,
        }
    }

    fn render(&self, buffer: &DynamicImage, target: Size) -> Result<DynamicImage, CodecError> {
        let (width, height) = target.to_pixels().ok_or(CodecError::DegenerateSize {
            width: target.width,
            height: target.height,
        })?;
        Ok(buffer.resize_exact(width, height, FilterType::Lanczos3))
    }

    fn encode_lossless(&self, buffer: &DynamicImage) -> Result<Vec<u8>, CodecError> {
        let converted = png_compatible(buffer);
        let img = converted.as_ref().unwrap_or(buffer);

        let mut bytes = Vec::new();
        img.write_with_encoder(PngEncoder::new(&mut bytes))
            .map_err(|e| CodecError::EncodeFailed(format!("PNG encode failed: {}", e)))?;
        Ok(bytes)
    }

    fn encode_lossy(&self, buffer: &DynamicImage, quality: Quality) -> Result<Vec<u8>, CodecError> {
        let rgb = DynamicImage::ImageRgb8(buffer.to_rgb8());

        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.value() as u8);
        rgb.write_with_encoder(encoder)
            .map_err(|e| CodecError::EncodeFailed(format!("JPEG encode failed: {}", e)))?;
        Ok(bytes)
    }
}
