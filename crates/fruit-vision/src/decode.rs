//! Decoding uploaded bytes into pixels.

use image::{DynamicImage, ImageFormat};

use crate::error::{VisionError, VisionResult};

/// Raster formats accepted from uploads.
pub const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
    ImageFormat::Bmp,
];

/// Decode an encoded raster image.
///
/// The format is sniffed from the magic bytes, never from a file name.
/// Unrecognised or corrupt input fails instead of producing an empty image.
pub fn decode_image(bytes: &[u8]) -> VisionResult<DynamicImage> {
    if bytes.is_empty() {
        return Err(VisionError::unsupported_format("empty upload"));
    }

    let format = image::guess_format(bytes)
        .map_err(|_| VisionError::unsupported_format("unrecognised image signature"))?;

    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(VisionError::unsupported_format(format!("{:?}", format)));
    }

    Ok(image::load_from_memory_with_format(bytes, format)?)
}
