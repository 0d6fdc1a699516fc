//! Per-file routing state machine.
//!
//! ```text
//! Discovered ─normalize─▶ Normalized ─stat─▶ SizeChecked ─┬─▶ Compliant ──move──────────────▶ compressed/
//!                                                          └─▶ Oversized ─┬─ compress ≤ ceiling ─▶ compressed/
//!                                                                         ├─ resize   ≤ ceiling ─▶ compressed/
//!                                                                         └─ otherwise ──────────▶ incompatible/ (original)
//! ```
//!
//! Every file ends in exactly one destination folder and no longer exists at
//! its source path. The one exception is a filesystem failure partway through,
//! which is reported as [`Outcome::Failed`] and leaves the file wherever it
//! was when the failure hit.
//!
//! Routing never aborts the batch. Codec failures are routed to the
//! incompatible folder like any other failed reduction.

use crate::imaging::{BackendError, ImageBackend, ReductionAttempt, ReductionError, SizeReducer, Stage};
use crate::layout::{Destination, TargetLayout, move_file};
use crate::naming;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Filesystem failure while routing one file.
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("refusing to overwrite {}", path.display())]
    Collision { path: PathBuf },
}

impl RouteError {
    fn at(path: &Path) -> impl FnOnce(io::Error) -> RouteError + '_ {
        move |source| {
            if source.kind() == io::ErrorKind::AlreadyExists {
                RouteError::Collision {
                    path: path.to_path_buf(),
                }
            } else {
                RouteError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        }
    }
}

/// Why a file ended in the incompatible folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncompatibleReason {
    /// Both reduction stages ran and the result was still over the ceiling.
    StillOversized,
    /// The image could not be decoded or encoded.
    CodecFailure(String),
}

/// Terminal result for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Already at or under the ceiling; moved unchanged.
    Compliant,
    /// Re-encoding alone met the ceiling.
    Compressed,
    /// Met the ceiling after downscaling.
    Resized,
    /// Original moved aside untouched.
    Incompatible { reason: IncompatibleReason },
    /// A filesystem error stopped routing for this file. `left_at` is where
    /// the file still sits, if it still exists.
    Failed {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        left_at: Option<PathBuf>,
    },
    /// Oversized leftover moved aside by the sweep.
    Swept,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Path the file was discovered at.
    pub source: PathBuf,
    /// Where the file ended up; `None` when routing failed.
    pub destination: Option<PathBuf>,
    pub outcome: Outcome,
    /// Reduction stages that ran, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<ReductionAttempt>,
}

impl FileReport {
    pub fn new(source: &Path, destination: Option<PathBuf>, outcome: Outcome) -> Self {
        Self {
            source: source.to_path_buf(),
            destination,
            outcome,
            attempts: Vec::new(),
        }
    }

    fn with_attempts(mut self, attempts: Vec<ReductionAttempt>) -> Self {
        self.attempts = attempts;
        self
    }
}

/// A file being routed. `path` follows the file as it is renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    pub raw_name: String,
    pub normalized_name: String,
    pub size: u64,
}

impl ImageFile {
    /// Where the file was first found, before any rename.
    pub fn discovered_path(&self) -> PathBuf {
        self.path.with_file_name(&self.raw_name)
    }
}

enum State {
    Discovered(PathBuf),
    Normalized(ImageFile),
    SizeChecked(ImageFile),
    Compliant(ImageFile),
    Oversized(ImageFile),
    Done(FileReport),
}

impl State {
    /// Where the file is on disk before this state's step runs.
    fn location(&self) -> Option<&Path> {
        match self {
            State::Discovered(path) => Some(path),
            State::Normalized(file)
            | State::SizeChecked(file)
            | State::Compliant(file)
            | State::Oversized(file) => Some(&file.path),
            State::Done(_) => None,
        }
    }
}

/// Drives files from discovery to a destination folder.
pub struct FileRouter<'a, B: ImageBackend> {
    reducer: SizeReducer<'a, B>,
    layout: &'a TargetLayout,
}

impl<'a, B: ImageBackend> FileRouter<'a, B> {
    pub fn new(reducer: SizeReducer<'a, B>, layout: &'a TargetLayout) -> Self {
        Self { reducer, layout }
    }

    /// Route one discovered file to its terminal state.
    pub fn route(&self, path: &Path) -> FileReport {
        let mut state = State::Discovered(path.to_path_buf());
        loop {
            let location = state.location().map(Path::to_path_buf);
            if let State::Done(report) = state {
                return report;
            }
            state = match self.step(state) {
                Ok(next) => next,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "routing failed");
                    State::Done(FileReport::new(
                        path,
                        None,
                        Outcome::Failed {
                            error: e.to_string(),
                            left_at: location.filter(|p| p.exists()),
                        },
                    ))
                }
            };
        }
    }

    fn step(&self, state: State) -> Result<State, RouteError> {
        match state {
            State::Discovered(path) => self.normalize(path).map(State::Normalized),
            State::Normalized(file) => {
                let size = std::fs::metadata(&file.path)
                    .map_err(RouteError::at(&file.path))?
                    .len();
                Ok(State::SizeChecked(ImageFile { size, ..file }))
            }
            State::SizeChecked(file) => Ok(if file.size <= self.reducer.max_bytes() {
                State::Compliant(file)
            } else {
                State::Oversized(file)
            }),
            State::Compliant(file) => {
                let dest = self
                    .layout
                    .place(&file.path, Destination::Compressed, &file.normalized_name)
                    .map_err(RouteError::at(&file.path))?;
                info!(file = %file.normalized_name, size = file.size, "compliant");
                Ok(State::Done(FileReport::new(
                    &file.discovered_path(),
                    Some(dest),
                    Outcome::Compliant,
                )))
            }
            State::Oversized(file) => self.reduce(file).map(State::Done),
            done @ State::Done(_) => Ok(done),
        }
    }

    /// Rename the file in place if its name normalizes to something else.
    fn normalize(&self, path: PathBuf) -> Result<ImageFile, RouteError> {
        let raw_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let normalized = naming::normalize(&raw_name);
        if normalized == raw_name {
            return Ok(ImageFile {
                path,
                normalized_name: raw_name.clone(),
                raw_name,
                size: 0,
            });
        }

        let dir = path.parent().unwrap_or(Path::new("."));
        let renamed = naming::unique_path(dir, &normalized);
        move_file(&path, &renamed).map_err(RouteError::at(&path))?;
        let normalized_name = renamed
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(normalized);
        info!(from = %raw_name, to = %normalized_name, "normalized name");

        Ok(ImageFile {
            path: renamed,
            raw_name,
            normalized_name,
            size: 0,
        })
    }

    /// Run the reduction stages into a staging file in the compressed folder
    /// and decide where the file ends up.
    fn reduce(&self, file: ImageFile) -> Result<FileReport, RouteError> {
        let staging = self
            .layout
            .slot(Destination::Compressed, &file.normalized_name)
            .map_err(RouteError::at(self.layout.dir(Destination::Compressed)))?;
        debug!(file = %file.normalized_name, size = file.size, staging = %staging.display(), "oversized");

        let failure = match self.reducer.reduce(&file.path, &staging) {
            Ok(attempts) => match attempts.last().copied() {
                Some(last) if last.size <= self.reducer.max_bytes() => {
                    remove_original(&file.path, &staging)?;
                    let outcome = match last.stage {
                        Stage::Compress => Outcome::Compressed,
                        Stage::Resize => Outcome::Resized,
                    };
                    info!(file = %file.normalized_name, from = file.size, to = last.size, ?outcome, "reduced");
                    return Ok(FileReport::new(&file.discovered_path(), Some(staging), outcome)
                        .with_attempts(attempts));
                }
                _ => {
                    discard_staging(&staging)?;
                    let dest = self.set_aside(&file)?;
                    info!(file = %file.normalized_name, dest = %dest.display(), "still oversized");
                    return Ok(FileReport::new(
                        &file.discovered_path(),
                        Some(dest),
                        Outcome::Incompatible {
                            reason: IncompatibleReason::StillOversized,
                        },
                    )
                    .with_attempts(attempts));
                }
            },
            Err(ReductionError {
                source: BackendError::Io(source),
                ..
            }) => {
                discard_staging(&staging)?;
                return Err(RouteError::Io {
                    path: file.path,
                    source,
                });
            }
            Err(e) => e,
        };

        let reason = failure.source.to_string();
        warn!(file = %file.normalized_name, error = %reason, "codec failure");
        discard_staging(&staging)?;
        let dest = self.set_aside(&file)?;
        Ok(FileReport::new(
            &file.discovered_path(),
            Some(dest),
            Outcome::Incompatible {
                reason: IncompatibleReason::CodecFailure(reason),
            },
        )
        .with_attempts(failure.attempts))
    }

    /// Move the untouched original into the incompatible folder.
    fn set_aside(&self, file: &ImageFile) -> Result<PathBuf, RouteError> {
        self.layout
            .place(&file.path, Destination::Incompatible, &file.normalized_name)
            .map_err(RouteError::at(&file.path))
    }
}

/// Delete the original once its reduced copy is in place.
///
/// An original that is already gone leaves the reduced copy as the only one,
/// which is kept. Any other failure leaves the original where it is, so the
/// reduced copy is discarded.
fn remove_original(original: &Path, staging: &Path) -> Result<(), RouteError> {
    match std::fs::remove_file(original) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %original.display(), "original vanished during reduction");
            Ok(())
        }
        Err(e) => {
            discard_staging(staging)?;
            Err(RouteError::at(original)(e))
        }
    }
}

fn discard_staging(staging: &Path) -> Result<(), RouteError> {
    match std::fs::remove_file(staging) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RouteError::at(staging)(e)),
    }
}
