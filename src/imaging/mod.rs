//! Image reduction: pure Rust, no system codecs.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG, TIFF, BMP) |
//! | **Orientation** | `ImageDecoder::orientation`, read while decoding |
//! | **Compress** | re-encode at a fixed quality, same pixel size |
//! | **Resize** | Lanczos3 into a bounding box, never enlarging |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Reduce**: [`SizeReducer`], the two-stage strategy on top of a backend

pub mod backend;
mod calculations;
mod orientation;
mod params;
pub mod reduce;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::fit_within;
pub use params::{BoundingBox, CompressParams, Quality, ResizeParams};
pub use reduce::{ReductionAttempt, ReductionError, SizeReducer, Stage};
pub use rust_backend::RustBackend;
