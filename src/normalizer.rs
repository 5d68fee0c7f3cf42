//! Image normalization
//!
//! Takes a self-describing payload and brings it to the requested encoding and
//! bounding box. The decision tree is small:
//!
//! - same encoding and no complete target box: the payload passes through
//!   untouched, nothing is decoded
//! - otherwise the image is decoded and fitted into the box (width first,
//!   then height, aspect ratio preserved)
//! - the image is redrawn and exported only when the encoding differs or the
//!   fitted size is smaller than the original; a payload that already fits is
//!   returned as-is

use crate::config::ResizeFilter;
use crate::data_url::DataUrl;
use crate::errors::CameraError;
use crate::types::{EncodingType, Quality, TargetSize};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

/// Fit `original` into `target`, preserving aspect ratio.
///
/// Width overflow is corrected first; height overflow is then corrected
/// independently, without re-checking width. Unset bounds are ignored.
///
/// ```
/// # use camera_proxy::normalizer::fit_dimensions;
/// # use camera_proxy::types::TargetSize;
/// assert_eq!(fit_dimensions((400, 300), TargetSize::new(200, 200)), (200.0, 150.0));
/// assert_eq!(fit_dimensions((300, 600), TargetSize::new(200, 200)), (100.0, 200.0));
/// ```
pub fn fit_dimensions(original: (u32, u32), target: TargetSize) -> (f64, f64) {
    let (original_w, original_h) = (original.0 as f64, original.1 as f64);
    let ratio = original_w / original_h;

    let (mut w, mut h) = (original_w, original_h);

    if let Some(target_w) = target.width {
        if w > target_w as f64 {
            w = target_w as f64;
            h = w / ratio;
        }
    }

    if let Some(target_h) = target.height {
        if h > target_h as f64 {
            h = target_h as f64;
            w = h * ratio;
        }
    }

    (w, h)
}

/// Integer surface size for fitted dimensions. Fractions are truncated the
/// way a drawing surface truncates on assignment; never below one pixel.
pub fn surface_size(fitted: (f64, f64)) -> (u32, u32) {
    let (w, h) = fitted;
    ((w.trunc() as u32).max(1), (h.trunc() as u32).max(1))
}

/// Decode a data URL into a bitmap
pub fn decode(payload: &DataUrl) -> Result<DynamicImage, CameraError> {
    let bytes = payload.decode_bytes()?;
    image::load_from_memory(&bytes).map_err(|e| CameraError::DecodeFailed(e.to_string()))
}

/// Export a bitmap as a data URL. Encodings the image stack cannot write fall
/// back to PNG, matching what a drawing surface does with unknown types.
pub fn export(
    image: &DynamicImage,
    encoding: &EncodingType,
    quality: Quality,
) -> Result<DataUrl, CameraError> {
    let (format, mime) = match encoding.image_format() {
        Some(format) if format.writing_enabled() => (format, encoding.mime().to_string()),
        _ => {
            log::warn!("Cannot encode {}, falling back to image/png", encoding);
            (ImageFormat::Png, "image/png".to_string())
        }
    };

    let mut buffer = Vec::new();
    let written = match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.jpeg_quality());
            DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)
        }
        other => DynamicImage::ImageRgba8(image.to_rgba8())
            .write_to(&mut Cursor::new(&mut buffer), other),
    };
    written.map_err(|e| CameraError::EncodeFailed(e.to_string()))?;

    log::debug!(
        "Exported {}x{} as {} ({} bytes)",
        image.width(),
        image.height(),
        mime,
        buffer.len()
    );
    Ok(DataUrl::from_bytes(&mime, &buffer))
}

/// Converts and scales image payloads
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    filter: ResizeFilter,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(ResizeFilter::Triangle)
    }
}

impl Normalizer {
    pub fn new(filter: ResizeFilter) -> Self {
        Self { filter }
    }

    /// Draw `image` onto a surface of exactly `width` x `height`
    pub fn draw(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        if image.dimensions() == (width, height) {
            image.clone()
        } else {
            image.resize_exact(width, height, self.filter.as_filter_type())
        }
    }

    pub fn normalize(
        &self,
        payload: DataUrl,
        encoding: &EncodingType,
        target: TargetSize,
        quality: Quality,
    ) -> Result<DataUrl, CameraError> {
        let must_convert = !encoding.matches(payload.mime_type());

        if !must_convert && !target.is_box() {
            log::debug!("Payload already {} and no target box, passing through", encoding);
            return Ok(payload);
        }

        let image = decode(&payload)?;
        self.normalize_decoded(payload, &image, encoding, target, quality)
    }

    /// Second half of [`Normalizer::normalize`], for a payload whose bitmap
    /// is already decoded
    pub fn normalize_decoded(
        &self,
        payload: DataUrl,
        image: &DynamicImage,
        encoding: &EncodingType,
        target: TargetSize,
        quality: Quality,
    ) -> Result<DataUrl, CameraError> {
        let must_convert = !encoding.matches(payload.mime_type());
        let (original_w, original_h) = image.dimensions();

        if original_w == 0 || original_h == 0 {
            return Err(CameraError::ImageSizeUnknown);
        }

        let (w, h) = fit_dimensions((original_w, original_h), target);
        let shrinks = w < original_w as f64 || h < original_h as f64;

        if !must_convert && !shrinks {
            log::debug!(
                "{}x{} already fits {:?}, returning original payload",
                original_w,
                original_h,
                target
            );
            return Ok(payload);
        }

        let (surface_w, surface_h) = surface_size((w, h));
        log::debug!(
            "Redrawing {}x{} {} as {}x{} {}",
            original_w,
            original_h,
            payload.mime_type(),
            surface_w,
            surface_h,
            encoding
        );
        let surface = self.draw(image, surface_w, surface_h);
        export(&surface, encoding, quality)
    }
}

/// Normalize with the default bilinear filter
pub fn normalize(
    payload: DataUrl,
    encoding: &EncodingType,
    target: TargetSize,
    quality: Quality,
) -> Result<DataUrl, CameraError> {
    Normalizer::default().normalize(payload, encoding, target, quality)
}
