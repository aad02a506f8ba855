//! Raster image re-encoding.
//!
//! Decodes the source pixel buffer and re-encodes it in the target format.
//! Format sniffing is left to the decoder; a payload that does not decode is a
//! conversion failure regardless of what its fragment type claims.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use crate::error::{Error, Result};
use crate::model::catalog::TargetFormat;

/// Re-encode image `data` into the `target` raster format.
pub fn transcode(target: TargetFormat, data: &[u8]) -> Result<Vec<u8>> {
    let format = match target {
        TargetFormat::Png => ImageFormat::Png,
        TargetFormat::Jpg => ImageFormat::Jpeg,
        TargetFormat::Webp => ImageFormat::WebP,
        TargetFormat::Gif => ImageFormat::Gif,
        TargetFormat::Avif => ImageFormat::Avif,
        other => {
            return Err(Error::conversion_failed(format!(
                "{} is not a raster format",
                other.extension()
            )))
        }
    };

    let img = image::load_from_memory(data)
        .map_err(|e| Error::conversion_failed(format!("failed to decode image: {e}")))?;

    // JPEG has no alpha channel.
    let img = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)
        .map_err(|e| Error::conversion_failed(format!("failed to encode image: {e}")))?;
    Ok(buf.into_inner())
}
