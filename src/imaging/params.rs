//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`reduce`](super::reduce) stages (which decide what
//! to encode) and the [`backend`](super::backend) (which does the pixel work),
//! so the stages can run against a mock backend in tests.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Box an image is shrunk to fit inside, aspect ratio preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

/// Re-encode at the original pixel dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub quality: Quality,
}

/// Downscale into `bounds`, then re-encode. `source` and `output` may be the same file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub bounds: BoundingBox,
    pub quality: Quality,
}
