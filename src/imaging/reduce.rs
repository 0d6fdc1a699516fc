//! Two-stage byte-size reduction.
//!
//! ```text
//! source ──compress──▶ staging        (same pixels, fixed quality)
//!                         │ still over the ceiling?
//!                         ▼
//!                      staging ──resize──▶ staging   (fit bounding box, same quality)
//! ```
//!
//! The strategy is bounded: one fixed quality, one fixed bounding box, no
//! search. Stage B may still leave the file over the ceiling; that is a normal
//! result for the caller to route, not an error.

use super::backend::{BackendError, ImageBackend};
use super::params::{BoundingBox, CompressParams, Quality, ResizeParams};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Which reduction stage produced a size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Compress,
    Resize,
}

/// Outcome of one stage: the staging file's size right after it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReductionAttempt {
    pub stage: Stage,
    pub size: u64,
}

/// A stage failed. `attempts` holds the stages that finished before it.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct ReductionError {
    pub attempts: Vec<ReductionAttempt>,
    pub source: BackendError,
}

/// Runs the compress and resize stages against a backend.
pub struct SizeReducer<'a, B: ImageBackend> {
    backend: &'a B,
    max_bytes: u64,
    quality: Quality,
    bounds: BoundingBox,
}

impl<'a, B: ImageBackend> SizeReducer<'a, B> {
    pub fn new(backend: &'a B, max_bytes: u64, quality: Quality, bounds: BoundingBox) -> Self {
        Self {
            backend,
            max_bytes,
            quality,
            bounds,
        }
    }

    /// Reduce `source` into `staging`.
    ///
    /// Returns the attempts made, in order: one when compression alone meets
    /// the ceiling, two otherwise. The last attempt describes what is on disk
    /// at `staging`. A codec failure in either stage is returned as an error
    /// carrying the attempts that finished before it, and may leave a partial
    /// file at `staging`.
    pub fn reduce(
        &self,
        source: &Path,
        staging: &Path,
    ) -> Result<Vec<ReductionAttempt>, ReductionError> {
        let mut attempts = Vec::with_capacity(2);

        let compressed = self
            .backend
            .compress(&CompressParams {
                source: source.to_path_buf(),
                output: staging.to_path_buf(),
                quality: self.quality,
            })
            .and_then(|()| measure(Stage::Compress, staging));
        let compressed = match compressed {
            Ok(attempt) => attempt,
            Err(e) => return Err(ReductionError { attempts, source: e }),
        };
        attempts.push(compressed);

        if compressed.size <= self.max_bytes {
            return Ok(attempts);
        }

        let resized = self
            .backend
            .resize(&ResizeParams {
                source: staging.to_path_buf(),
                output: staging.to_path_buf(),
                bounds: self.bounds,
                quality: self.quality,
            })
            .and_then(|()| measure(Stage::Resize, staging));
        match resized {
            Ok(attempt) => {
                attempts.push(attempt);
                Ok(attempts)
            }
            Err(e) => Err(ReductionError { attempts, source: e }),
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }
}

/// Size of the staging file right after `stage` wrote it.
fn measure(stage: Stage, staging: &Path) -> Result<ReductionAttempt, BackendError> {
    let size = std::fs::metadata(staging)?.len();
    debug!(path = %staging.display(), ?stage, size, "stage finished");
    Ok(ReductionAttempt { stage, size })
}
