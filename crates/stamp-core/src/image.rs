//! Stamp image probing

use crate::geometry::Size;
use crate::{Result, StampError};
use image::ImageReader;
use std::io::Cursor;

impl From<image::ImageError> for StampError {
    fn from(err: image::ImageError) -> Self {
        StampError::ImageError(err.to_string())
    }
}

/// Raster formats accepted for seal and signature images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Detect image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 8 {
        return Err(StampError::ImageError("Image data too short".to_string()));
    }

    // JPEG starts with FF D8 FF
    if data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Ok(ImageFormat::Jpeg);
    }

    // PNG signature
    if data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Ok(ImageFormat::Png);
    }

    Err(StampError::ImageError("Unknown image format".to_string()))
}

/// Read the pixel dimensions of a seal or signature image without decoding it
pub fn probe_image_size(data: &[u8]) -> Result<Size> {
    let format = detect_format(data)?;

    let reader = ImageReader::with_format(
        Cursor::new(data),
        match format {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
        },
    );
    let (width, height) = reader.into_dimensions()?;

    if width == 0 || height == 0 {
        return Err(StampError::ImageError(format!(
            "Image has empty dimensions {width}x{height}"
        )));
    }

    Ok(Size::new(width as f64, height as f64))
}
