//! Image codec backend trait and shared error type.
//!
//! The [`ImageBackend`] trait defines the two encode operations the reduction
//! stages need: re-encode at full size, and downscale then re-encode. Both
//! write a file and report nothing else; the caller measures the result on disk.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the
//! [`MockBackend`](tests::MockBackend), which writes files of scripted sizes.

use super::params::{CompressParams, ResizeParams};
use thiserror::Error;

/// Failure at the codec boundary.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Failed to encode {path}: {message}")]
    Encode { path: String, message: String },
}

/// Trait for image codec backends.
pub trait ImageBackend {
    /// Decode `source`, correct its orientation, and re-encode to `output` at `quality`.
    fn compress(&self, params: &CompressParams) -> Result<(), BackendError>;

    /// Decode `source`, correct its orientation, shrink into `bounds`, and
    /// re-encode to `output` at `quality`.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}

impl<B: ImageBackend + ?Sized> ImageBackend for &B {
    fn compress(&self, params: &CompressParams) -> Result<(), BackendError> {
        (**self).compress(params)
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        (**self).resize(params)
    }
}
