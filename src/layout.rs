//! The target directory and its two destination folders.
//!
//! ```text
//! <target>/
//! ├── compressed_images/        files at or under the ceiling
//! └── incompatible_originals/   originals that could not be reduced
//! ```
//!
//! Folders are created on first use. Every placement goes through
//! [`naming::unique_path`](crate::naming::unique_path), so nothing already in
//! a destination folder is ever overwritten.

use crate::config::PipelineConfig;
use crate::naming::unique_path;
use std::io;
use std::path::{Path, PathBuf};

/// One of the two folders a routed file can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Compressed,
    Incompatible,
}

/// Resolved destination folder paths under one target directory.
#[derive(Debug, Clone)]
pub struct TargetLayout {
    root: PathBuf,
    compressed: PathBuf,
    incompatible: PathBuf,
}

impl TargetLayout {
    pub fn new(target: &Path, config: &PipelineConfig) -> Self {
        Self {
            root: target.to_path_buf(),
            compressed: target.join(&config.compressed_dir),
            incompatible: target.join(&config.incompatible_dir),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, destination: Destination) -> &Path {
        match destination {
            Destination::Compressed => &self.compressed,
            Destination::Incompatible => &self.incompatible,
        }
    }

    /// Create a destination folder if missing. Existing folders are left alone.
    pub fn ensure(&self, destination: Destination) -> io::Result<&Path> {
        let dir = self.dir(destination);
        std::fs::create_dir_all(dir)?;
        Ok(dir)
    }

    /// True when `path` is one of the destination folders or lies beneath one.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.compressed) || path.starts_with(&self.incompatible)
    }

    /// A free path for `name` inside `destination`, creating the folder first.
    pub fn slot(&self, destination: Destination, name: &str) -> io::Result<PathBuf> {
        let dir = self.ensure(destination)?;
        Ok(unique_path(dir, name))
    }

    /// Move `source` into `destination` under `name`, never overwriting.
    /// Returns the final path.
    pub fn place(&self, source: &Path, destination: Destination, name: &str) -> io::Result<PathBuf> {
        let dest = self.slot(destination, name)?;
        move_file(source, &dest)?;
        Ok(dest)
    }
}

/// Rename `from` to `to`, falling back to copy-then-delete across filesystems.
///
/// Fails with [`io::ErrorKind::AlreadyExists`] instead of replacing an existing `to`.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if to.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", to.display()),
        ));
    }
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        }
        Err(e) => Err(e),
    }
}
