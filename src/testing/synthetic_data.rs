//! Synthetic images
//!
//! Gradient test pictures in any encodable format, as bitmaps, raw file
//! bytes, data URLs or picked files.

use crate::data_url::DataUrl;
use crate::page::SelectedFile;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

/// RGB gradient that varies by position
pub fn synthetic_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            (x % 256) as u8,
            (y % 256) as u8,
            ((x + y) % 256) as u8,
        ])
    });
    DynamicImage::ImageRgb8(img)
}

/// Encoded file bytes of a synthetic image
pub fn synthetic_image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    synthetic_image(width, height)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("synthetic image must encode");
    bytes
}

/// Data URL of a synthetic image
pub fn synthetic_data_url(width: u32, height: u32, format: ImageFormat) -> DataUrl {
    DataUrl::from_bytes(
        format.to_mime_type(),
        &synthetic_image_bytes(width, height, format),
    )
}

/// A picked file holding a synthetic image
pub fn synthetic_file(name: &str, width: u32, height: u32, format: ImageFormat) -> SelectedFile {
    SelectedFile::new(
        name,
        format.to_mime_type(),
        synthetic_image_bytes(width, height, format),
    )
}
