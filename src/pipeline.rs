//! The shared pipeline core.
//!
//! Both front ends end up here: [`Pipeline::run`] takes a source and a target
//! directory and returns a [`RunReport`].
//!
//! ```text
//! source/                       target/
//! ├── a.jpg   ──route──▶        ├── compressed_images/a.jpg
//! ├── b.png   ──route──▶        ├── incompatible_originals/b.png
//! └── sub/    (not entered)     └── … sweep moves oversized leftovers aside
//! ```
//!
//! Files are routed one at a time, in name order. A per-file failure is
//! recorded in the report and the run continues; only a missing or unreadable
//! source directory stops the run.

use crate::config::PipelineConfig;
use crate::imaging::{ImageBackend, RustBackend, SizeReducer};
use crate::layout::TargetLayout;
use crate::router::{FileReport, FileRouter, Outcome};
use crate::walker;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Source directory not found: {}", .0.display())]
    SourceMissing(PathBuf),
    #[error("Source is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Counts per outcome. The first five cover the main pass; `swept` and
/// `sweep_failed` cover the sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub compliant: usize,
    pub compressed: usize,
    pub resized: usize,
    pub incompatible: usize,
    pub failed: usize,
    pub swept: usize,
    pub sweep_failed: usize,
}

impl Summary {
    /// Files the main pass routed.
    pub fn routed(&self) -> usize {
        self.compliant + self.compressed + self.resized + self.incompatible + self.failed
    }

    pub fn total(&self) -> usize {
        self.routed() + self.swept + self.sweep_failed
    }
}

/// Everything one run did: one entry per discovered file in `files`, one per
/// file the sweep moved or tried to move in `swept`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub source: PathBuf,
    pub target: PathBuf,
    pub files: Vec<FileReport>,
    pub swept: Vec<FileReport>,
    pub summary: Summary,
}

impl RunReport {
    pub fn new(
        source: &Path,
        target: &Path,
        files: Vec<FileReport>,
        swept: Vec<FileReport>,
    ) -> Self {
        let mut summary = Summary::default();
        for file in &files {
            let counter = match file.outcome {
                Outcome::Compliant => &mut summary.compliant,
                Outcome::Compressed => &mut summary.compressed,
                Outcome::Resized => &mut summary.resized,
                Outcome::Incompatible { .. } => &mut summary.incompatible,
                Outcome::Failed { .. } => &mut summary.failed,
                Outcome::Swept => &mut summary.swept,
            };
            *counter += 1;
        }
        for file in &swept {
            match file.outcome {
                Outcome::Swept => summary.swept += 1,
                _ => summary.sweep_failed += 1,
            }
        }
        Self {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            files,
            swept,
            summary,
        }
    }

    /// Number of files, in either pass, that hit a filesystem failure.
    pub fn failures(&self) -> usize {
        self.summary.failed + self.summary.sweep_failed
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }
}

/// Pipeline bound to a config and an image backend.
pub struct Pipeline<B: ImageBackend = RustBackend> {
    backend: B,
    config: PipelineConfig,
}

impl Pipeline<RustBackend> {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_backend(RustBackend::new(), config)
    }
}

impl<B: ImageBackend> Pipeline<B> {
    pub fn with_backend(backend: B, config: PipelineConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Route every image directly inside `source` into the destination
    /// folders under `target`, then sweep `target` if enabled.
    ///
    /// `source` and `target` may be the same directory.
    pub fn run(&self, source: &Path, target: &Path) -> Result<RunReport, PipelineError> {
        if !source.exists() {
            return Err(PipelineError::SourceMissing(source.to_path_buf()));
        }
        if !source.is_dir() {
            return Err(PipelineError::NotADirectory(source.to_path_buf()));
        }

        let config = &self.config;
        let layout = TargetLayout::new(target, config);
        let candidates = walker::discover(source, &layout).map_err(|e| PipelineError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;
        info!(source = %source.display(), count = candidates.len(), "discovered images");

        let reducer = SizeReducer::new(
            &self.backend,
            config.max_bytes,
            config.quality(),
            config.bounding_box(),
        );
        let router = FileRouter::new(reducer, &layout);
        let files: Vec<FileReport> = candidates.iter().map(|path| router.route(path)).collect();

        let swept = if config.sweep {
            let stuck: HashSet<PathBuf> = files
                .iter()
                .filter_map(|f| match &f.outcome {
                    Outcome::Failed { left_at, .. } => left_at.clone(),
                    _ => None,
                })
                .collect();
            let swept = walker::sweep(&layout, config, &stuck);
            info!(target = %target.display(), count = swept.len(), "sweep finished");
            swept
        } else {
            Vec::new()
        };

        let report = RunReport::new(source, target, files, swept);
        info!(
            total = report.summary.total(),
            failed = report.failures(),
            "run finished"
        );
        Ok(report)
    }
}

/// Run the pipeline with the production backend.
pub fn run(source: &Path, target: &Path, config: &PipelineConfig) -> Result<RunReport, PipelineError> {
    Pipeline::new(config.clone()).run(source, target)
}
