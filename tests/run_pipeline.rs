//! End-to-end runs against the real `image` backend.
//!
//! Each test builds a small folder of synthetic images in a temp directory and
//! picks a ceiling that forces the path it wants to exercise. Noisy pixels keep
//! JPEGs large at quality 100, so a quality-85 re-encode reliably shrinks them.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use sizegate::config::PipelineConfig;
use sizegate::pipeline::Pipeline;
use sizegate::router::{IncompatibleReason, Outcome};
use std::path::Path;
use tempfile::TempDir;

fn noisy_image(width: u32, height: u32) -> RgbImage {
    let mut state: u32 = 0x9E37_79B9;
    RgbImage::from_fn(width, height, |x, y| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [a, b, c, _] = state.to_le_bytes();
        Rgb([a ^ (x as u8), b ^ (y as u8), c])
    })
}

fn encode_jpeg(img: &RgbImage, quality: u8) -> Vec<u8> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .unwrap();
    out
}

fn jpeg_bytes(width: u32, height: u32, quality: u8) -> Vec<u8> {
    encode_jpeg(&noisy_image(width, height), quality)
}

/// Size of what the compress stage will write for `bytes`: decode, then re-encode at 85.
fn recompressed_len(bytes: &[u8]) -> u64 {
    let decoded = image::load_from_memory(bytes).unwrap().to_rgb8();
    encode_jpeg(&decoded, 85).len() as u64
}

/// Prepend an Exif APP1 segment carrying only an orientation tag.
fn with_orientation(jpeg: &[u8], value: u16) -> Vec<u8> {
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

fn names(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn config(max_bytes: u64) -> PipelineConfig {
    PipelineConfig {
        max_bytes,
        ..Default::default()
    }
}

#[test]
fn compliant_file_keeps_its_bytes() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let bytes = jpeg_bytes(64, 48, 90);
    std::fs::write(dir.join("photo.jpg"), &bytes).unwrap();

    let report = Pipeline::new(PipelineConfig::default()).run(dir, dir).unwrap();

    assert_eq!(report.files[0].outcome, Outcome::Compliant);
    assert_eq!(
        std::fs::read(dir.join("compressed_images/photo.jpg")).unwrap(),
        bytes
    );
    assert!(!dir.join("photo.jpg").exists());
}

#[test]
fn compress_stage_alone_meets_ceiling() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let bytes = jpeg_bytes(400, 300, 100);
    std::fs::write(dir.join("big.jpg"), &bytes).unwrap();
    let ceiling = bytes.len() as u64 - 1;

    let report = Pipeline::new(config(ceiling)).run(dir, dir).unwrap();

    assert_eq!(report.files[0].outcome, Outcome::Compressed);
    let out = dir.join("compressed_images/big.jpg");
    assert!(std::fs::metadata(&out).unwrap().len() <= ceiling);
    assert_eq!(image::image_dimensions(&out).unwrap(), (400, 300));
    assert!(names(&dir.join("incompatible_originals")).is_empty());
}

#[test]
fn resize_stage_meets_ceiling() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let bytes = jpeg_bytes(800, 600, 100);
    std::fs::write(dir.join("huge.jpg"), &bytes).unwrap();
    let ceiling = recompressed_len(&bytes) - 1;

    let cfg = PipelineConfig {
        bounding_box: [200, 150],
        ..config(ceiling)
    };
    let report = Pipeline::new(cfg).run(dir, dir).unwrap();

    assert_eq!(report.files[0].outcome, Outcome::Resized);
    let out = dir.join("compressed_images/huge.jpg");
    assert!(std::fs::metadata(&out).unwrap().len() <= ceiling);
    assert_eq!(image::image_dimensions(&out).unwrap(), (200, 150));
}

#[test]
fn unshrinkable_originals_are_set_aside_untouched() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let jpeg = jpeg_bytes(64, 64, 95);
    std::fs::write(dir.join("unshrinkable.jpg"), &jpeg).unwrap();
    noisy_image(32, 32).save(dir.join("noise.png")).unwrap();
    let png = std::fs::read(dir.join("noise.png")).unwrap();

    let report = Pipeline::new(config(100)).run(dir, dir).unwrap();

    assert!(report.files.iter().all(|f| f.outcome
        == Outcome::Incompatible {
            reason: IncompatibleReason::StillOversized
        }));
    let incompatible = dir.join("incompatible_originals");
    assert_eq!(names(&incompatible), vec!["noise.png", "unshrinkable.jpg"]);
    assert_eq!(std::fs::read(incompatible.join("unshrinkable.jpg")).unwrap(), jpeg);
    assert_eq!(std::fs::read(incompatible.join("noise.png")).unwrap(), png);
    assert!(names(&dir.join("compressed_images")).is_empty());
}

#[test]
fn corrupt_file_does_not_stop_the_run() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let mut garbage = vec![0xFF, 0xD8];
    garbage.extend(std::iter::repeat_n(0x5A, 4000));
    std::fs::write(dir.join("a_corrupt.jpg"), &garbage).unwrap();
    std::fs::write(dir.join("b_fine.jpg"), jpeg_bytes(16, 16, 80)).unwrap();

    let report = Pipeline::new(config(2000)).run(dir, dir).unwrap();

    assert!(matches!(
        report.files[0].outcome,
        Outcome::Incompatible {
            reason: IncompatibleReason::CodecFailure(_)
        }
    ));
    assert_eq!(report.files[1].outcome, Outcome::Compliant);
    assert_eq!(
        std::fs::read(dir.join("incompatible_originals/a_corrupt.jpg")).unwrap(),
        garbage
    );
    assert!(report.is_success());
}

#[test]
fn orientation_tag_is_applied_before_encoding() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let bytes = with_orientation(&jpeg_bytes(80, 40, 100), 6);
    std::fs::write(dir.join("sideways.jpg"), &bytes).unwrap();

    let report = Pipeline::new(config(bytes.len() as u64 - 1))
        .run(dir, dir)
        .unwrap();

    assert_eq!(report.files[0].outcome, Outcome::Compressed);
    assert_eq!(
        image::image_dimensions(dir.join("compressed_images/sideways.jpg")).unwrap(),
        (40, 80)
    );
}

#[test]
fn facetune_export_is_renamed() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("in");
    let target = tmp.path().join("out");
    std::fs::create_dir(&source).unwrap();
    std::fs::write(
        source.join("Facetune_01-02-2023-10-11-12.jpg"),
        jpeg_bytes(16, 16, 80),
    )
    .unwrap();

    Pipeline::new(PipelineConfig::default())
        .run(&source, &target)
        .unwrap();

    assert_eq!(
        names(&target.join("compressed_images")),
        vec!["Facetune_10-11-12.jpg"]
    );
    assert!(names(&source).is_empty());
}

#[test]
fn nested_files_are_only_touched_by_the_sweep() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    std::fs::create_dir_all(dir.join("trip/day1")).unwrap();
    let deep = jpeg_bytes(128, 128, 100);
    std::fs::write(dir.join("trip/day1/deep.jpg"), &deep).unwrap();
    std::fs::write(dir.join("trip/tiny.jpg"), jpeg_bytes(8, 8, 50)).unwrap();
    std::fs::write(dir.join("top.jpg"), jpeg_bytes(8, 8, 50)).unwrap();

    let report = Pipeline::new(config(4000)).run(dir, dir).unwrap();

    assert_eq!(report.summary.compliant, 1);
    assert_eq!(report.summary.swept, 1);
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.swept[0].source, dir.join("trip/day1/deep.jpg"));
    assert_eq!(names(&dir.join("compressed_images")), vec!["top.jpg"]);
    assert_eq!(names(&dir.join("incompatible_originals")), vec!["deep.jpg"]);
    assert_eq!(
        std::fs::read(dir.join("incompatible_originals/deep.jpg")).unwrap(),
        deep
    );
    assert_eq!(names(&dir.join("trip")), vec!["day1", "tiny.jpg"]);
    assert!(names(&dir.join("trip/day1")).is_empty());
}
