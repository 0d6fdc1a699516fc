//! Pure Rust codec backend on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, BMP) | `image::ImageReader` with content sniffing |
//! | Orientation tag | `ImageDecoder::orientation` on the same decoder |
//! | Rotate | `DynamicImage::rotate90/180/270` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode JPEG | `JpegEncoder::new_with_quality` |
//! | Encode PNG | `PngEncoder::new_with_quality` (best compression, adaptive filter) |
//! | Encode TIFF, BMP | `DynamicImage::write_to` (lossless, quality does not apply) |
//!
//! The output format follows the output path's extension, so a routed file
//! keeps its name and its format.

use super::backend::{BackendError, ImageBackend};
use super::calculations::fit_within;
use super::orientation;
use super::params::{CompressParams, Quality, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{ColorType, DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Pure Rust backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Read, decode and orientation-correct an image.
///
/// A missing or unreadable orientation tag means no correction.
fn load_upright(path: &Path) -> Result<DynamicImage, BackendError> {
    let decode_error = |e: image::ImageError| BackendError::Decode {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()
        .map_err(decode_error)?;
    let tag = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let img = DynamicImage::from_decoder(decoder).map_err(decode_error)?;

    if tag != Orientation::NoTransforms {
        debug!(path = %path.display(), orientation = ?tag, "orientation tag");
    }
    Ok(orientation::correct(img, tag))
}

/// Encode `img` to `path` in the format implied by its extension.
fn save_image(img: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let encode_error = |message: String| BackendError::Encode {
        path: path.display().to_string(),
        message,
    };
    let format = ImageFormat::from_path(path).map_err(|e| encode_error(e.to_string()))?;

    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);

    let result = match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality.value());
            jpeg_compatible(img).write_with_encoder(encoder)
        }
        ImageFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut writer, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder)
        }
        ImageFormat::Tiff | ImageFormat::Bmp => img.write_to(&mut writer, format),
        other => return Err(encode_error(format!("unsupported output format {other:?}"))),
    };
    result.map_err(|e| encode_error(e.to_string()))?;
    writer.flush()?;
    Ok(())
}

/// JPEG has no alpha channel and no 16-bit samples.
fn jpeg_compatible(img: &DynamicImage) -> DynamicImage {
    match img.color() {
        ColorType::L8 | ColorType::Rgb8 => img.clone(),
        ColorType::La8 | ColorType::L16 | ColorType::La16 => {
            DynamicImage::ImageLuma8(img.to_luma8())
        }
        _ => DynamicImage::ImageRgb8(img.to_rgb8()),
    }
}

impl ImageBackend for RustBackend {
    fn compress(&self, params: &CompressParams) -> Result<(), BackendError> {
        let img = load_upright(&params.source)?;
        save_image(&img, &params.output, params.quality)
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_upright(&params.source)?;
        let (width, height) = fit_within((img.width(), img.height()), params.bounds);
        let resized = if (width, height) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(width, height, FilterType::Lanczos3)
        };
        save_image(&resized, &params.output, params.quality)
    }
}
