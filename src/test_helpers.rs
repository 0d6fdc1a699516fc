//! Shared test utilities for the sizegate test suite.
//!
//! Two kinds of fixture live here:
//!
//! - **Sized placeholders**: files of an exact byte length with no image data,
//!   for router and walker tests that run against the mock backend and only
//!   care about sizes on disk.
//! - **Real images**: small synthetic JPEG/PNG files for tests that go through
//!   the `image` crate.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_sized(&tmp.path().join("photo.jpg"), 2 * MIB);
//! assert_eq!(list_names(tmp.path()), vec!["photo.jpg"]);
//! ```

use image::{ImageEncoder, Rgb, RgbImage};
use std::path::Path;

pub const MIB: u64 = 1024 * 1024;

// =========================================================================
// Sized placeholders
// =========================================================================

/// Create (or truncate) `path` as a sparse file of exactly `len` bytes.
pub fn write_sized(path: &Path, len: u64) {
    let file = std::fs::File::create(path).unwrap();
    file.set_len(len).unwrap();
}

/// Byte length of the file at `path`.
pub fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).unwrap().len()
}

/// Sorted names of the entries directly inside `dir`; empty if `dir` is missing.
pub fn list_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// =========================================================================
// Real images
// =========================================================================

/// Deterministic noisy RGB image. Noise keeps JPEG output large at high
/// quality, so re-encoding at a lower quality measurably shrinks it.
pub fn noisy_image(width: u32, height: u32) -> RgbImage {
    let mut state: u32 = 0x1234_5678;
    RgbImage::from_fn(width, height, |x, y| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [a, b, c, _] = state.to_le_bytes();
        Rgb([a ^ (x as u8), b ^ (y as u8), c])
    })
}

/// Encode a noisy image as JPEG bytes at `quality`.
pub fn jpeg_bytes(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let img = noisy_image(width, height);
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// Write a noisy JPEG to `path`.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32, quality: u8) {
    std::fs::write(path, jpeg_bytes(width, height, quality)).unwrap();
}

/// Write a noisy PNG to `path`.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    noisy_image(width, height).save(path).unwrap();
}

/// Insert an Exif APP1 segment carrying only an orientation tag right after
/// the SOI marker of `jpeg`.
pub fn jpeg_with_orientation(jpeg: &[u8], value: u16) -> Vec<u8> {
    // Big-endian TIFF header, one IFD0 entry: 0x0112 SHORT x1
    let mut tiff = b"MM\0\x2A\0\0\0\x08".to_vec();
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&0x0112u16.to_be_bytes());
    tiff.extend_from_slice(&3u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&value.to_be_bytes());
    tiff.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}
